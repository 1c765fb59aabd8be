/// quick start - minimal example to get started
use instrument_engine_rs::{
    EnginePolicy, FdType, FixedDeposit, Loan, LoanType, Money, Rate, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let policy = EnginePolicy::standard();

    // a 1 lakh fixed deposit at 6.5% for a year
    let fd = FixedDeposit::open(
        "CUST-001",
        Money::from_major(100_000),
        Rate::from_percentage(dec!(6.5)),
        12,
        FdType::Regular,
        &policy,
        &time,
    )?;
    println!("fd matures on {} at ₹{}", fd.maturity_date.format("%Y-%m-%d"), fd.maturity_amount);
    println!("interest earned: ₹{}", fd.interest_earned());

    // a 5 lakh personal loan at 12% over 5 years
    let loan = Loan::open(
        "CUST-001",
        Money::from_major(500_000),
        Rate::from_percentage(dec!(12)),
        60,
        LoanType::Personal,
        &policy,
        &time,
    )?;
    println!("loan emi: ₹{} for {} months", loan.emi_amount, loan.tenure_months);

    Ok(())
}
