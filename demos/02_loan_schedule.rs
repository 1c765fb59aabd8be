/// loan schedule - emi pricing, amortization table and foreclosure
use instrument_engine_rs::{
    emi_quote, EnginePolicy, Loan, LoanType, Money, Rate, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan schedule ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let policy = EnginePolicy::standard();

    // 1. pricing
    println!("1. pricing");
    println!("----------");
    let principal = Money::from_major(500_000);
    let rate = Rate::from_percentage(dec!(12));
    let quote = emi_quote(principal, rate, 60);
    println!("  ₹{} at {} over 60 months", principal, rate);
    println!("  emi: ₹{}", quote.emi);
    println!("  total payable: ₹{}", quote.total_payable);
    println!("  total interest: ₹{}", quote.total_interest);

    // 2. open and disburse
    println!("\n2. open and disburse");
    println!("--------------------");
    let mut loan = Loan::open("CUST-001", principal, rate, 60, LoanType::Personal, &policy, &time)?;
    println!("  status: {:?}", loan.status);
    loan.disburse(&time)?;
    println!("  ✓ disbursed on {}", time.now().format("%Y-%m-%d"));
    println!("  status: {:?}", loan.status);

    // 3. amortization table, first and last rows
    println!("\n3. amortization table");
    println!("---------------------");
    let schedule = loan.schedule();
    println!("  no.  due date    principal   interest    closing");
    for row in schedule.installments.iter().take(3) {
        println!(
            "  {:>3}  {}  {:>9}  {:>9}  {:>10}",
            row.number,
            row.due_date.format("%Y-%m-%d"),
            row.principal_component.to_string(),
            row.interest_component.to_string(),
            row.closing_balance.to_string(),
        );
    }
    println!("  ...");
    if let Some(last) = schedule.installments.last() {
        println!(
            "  {:>3}  {}  {:>9}  {:>9}  {:>10}",
            last.number,
            last.due_date.format("%Y-%m-%d"),
            last.principal_component.to_string(),
            last.interest_component.to_string(),
            last.closing_balance.to_string(),
        );
    }
    println!("  schedule interest total: ₹{}", schedule.total_interest);

    // 4. a year of emis
    println!("\n4. a year of emis");
    println!("-----------------");
    for _ in 0..12 {
        controller.advance(Duration::days(30));
        loan.post_emi(&time)?;
    }
    println!("  paid {} of {} emis ({}% of tenure)", loan.paid_emis, loan.tenure_months, loan.progress_percent());
    println!("  outstanding: ₹{}", loan.outstanding_amount());
    println!("  next due: {}", loan.next_due_date().format("%Y-%m-%d"));

    // 5. foreclosure
    println!("\n5. foreclosure");
    println!("--------------");
    let settlement = loan.foreclose(&time)?;
    println!("  ✓ settled early at ₹{}", settlement);
    println!("  status: {:?}", loan.status);

    Ok(())
}
