/// deposit lifecycle - open, mature, renew and premature closure
use instrument_engine_rs::{
    EnginePolicy, FdType, FixedDeposit, Money, Rate, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== fixed deposit lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let policy = EnginePolicy::standard();

    // 1. opening
    println!("1. opening phase");
    println!("----------------");
    let mut fd = FixedDeposit::builder()
        .customer_id("CUST-001")
        .principal(Money::from_major(100_000))
        .rate(Rate::from_percentage(dec!(6.5)))
        .tenure_months(12)
        .auto_renewal(true)
        .nominee("R. Sharma", "spouse")
        .build(&policy, &time)?;

    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  principal: ₹{}", fd.principal);
    println!("  contracted rate: {} (effective {})", fd.rate, fd.effective_yield());
    println!("  matures {} at ₹{}", fd.maturity_date.format("%Y-%m-%d"), fd.maturity_amount);
    println!("  status: {:?}", fd.status);

    // 2. mid-term check
    println!("\n2. mid-term check");
    println!("-----------------");
    controller.advance(Duration::days(180));
    fd.check_maturity(&time);
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  status: {:?}", fd.status);
    println!("  days to maturity: {}", fd.days_to_maturity(&time));

    // 3. maturity
    println!("\n3. maturity phase");
    println!("-----------------");
    controller.advance(Duration::days(186));
    fd.check_maturity(&time);
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  status: {:?}", fd.status);
    println!("  payout due: ₹{}", fd.maturity_amount);

    // 4. renewal
    println!("\n4. renewal phase");
    println!("----------------");
    let renewed = fd.renew(&policy, &time)?;
    println!("  ✓ rolled ₹{} into a fresh 12-month deposit", renewed.principal);
    println!("  old status: {:?}", fd.status);
    println!("  new deposit matures {}", renewed.maturity_date.format("%Y-%m-%d"));

    // 5. premature closure on a second deposit
    println!("\n5. premature closure");
    println!("--------------------");
    let mut early = FixedDeposit::open(
        "CUST-002",
        Money::from_major(50_000),
        Rate::from_percentage(dec!(7)),
        24,
        FdType::Regular,
        &policy,
        &time,
    )?;
    controller.advance(Duration::days(250));
    let settlement = early.premature_close(&policy, &time)?;
    println!("  closed after ~8 months of a 24-month term");
    println!("  settlement at penalised rate: ₹{}", settlement);
    let payout = early.close(&time)?;
    println!("  ✓ paid out ₹{}", payout);

    // 6. event trail
    println!("\n6. event trail");
    println!("--------------");
    for event in early.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
