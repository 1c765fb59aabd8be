/// recurring deposit - monthly installments through to maturity
use instrument_engine_rs::{
    EnginePolicy, Money, Rate, RdType, RecurringDeposit, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== recurring deposit ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let policy = EnginePolicy::standard();

    // 1. opening
    println!("1. opening phase");
    println!("----------------");
    let mut rd = RecurringDeposit::builder()
        .customer_id("CUST-001")
        .monthly_amount(Money::from_major(2_000))
        .rate(Rate::from_percentage(dec!(6)))
        .tenure_months(12)
        .rd_type(RdType::Regular)
        .auto_debit(true)
        .build(&policy, &time)?;

    println!("  ₹{} a month for {} months", rd.monthly_amount, rd.tenure_months);
    println!("  maturity value: ₹{}", rd.maturity_amount);
    println!("  first installment due {}", rd.next_due_date().format("%Y-%m-%d"));

    // 2. six months of posting
    println!("\n2. installments");
    println!("---------------");
    for _ in 0..6 {
        controller.advance(Duration::days(30));
        let count = rd.post_installment(&time)?;
        println!(
            "  ✓ installment {} on {} (total ₹{})",
            count,
            time.now().format("%Y-%m-%d"),
            rd.total_paid
        );
    }

    // 3. a skipped month
    println!("\n3. a skipped month");
    println!("------------------");
    controller.advance(Duration::days(65));
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  overdue installments: {}", rd.overdue_installments(&time));
    println!("  accrued value so far: ₹{}", rd.accrued_value(&time));

    // 4. catching up to maturity
    println!("\n4. catching up");
    println!("--------------");
    while rd.paid_installments < rd.tenure_months {
        rd.post_installment(&time)?;
        controller.advance(Duration::days(30));
    }
    println!("  all {} installments in", rd.paid_installments);
    rd.check_maturity(&time);
    println!("  status on {}: {:?}", time.now().format("%Y-%m-%d"), rd.status);

    // 5. payout
    println!("\n5. payout");
    println!("---------");
    let payout = rd.close(&time)?;
    println!("  ✓ settled at ₹{}", payout);
    println!("  status: {:?}", rd.status);

    Ok(())
}
