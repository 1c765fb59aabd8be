pub mod compound;
pub mod recurring;

use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

pub use compound::{fd_maturity, fd_maturity_value, fd_premature_value};
pub use recurring::{rd_maturity, rd_maturity_value, InstallmentEntry, InstallmentLedger};

/// maturity projection for a deposit
#[derive(Debug, Clone, PartialEq)]
pub struct MaturityCalculation {
    pub invested: Money,
    pub maturity_amount: Money,
    pub interest_earned: Money,
}

/// (1 + rate)^periods by iterated multiplication; None on overflow
pub fn compound_factor(periodic_rate: Decimal, periods: u32) -> Option<Decimal> {
    let base = Decimal::ONE + periodic_rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(base)?;
    }
    Some(factor)
}

/// effective annual yield of a quarterly-compounded deposit rate
pub fn annualized_yield(annual_rate: Rate) -> Rate {
    match compound_factor(annual_rate.quarterly_rate(), 4) {
        Some(factor) => Rate::from_decimal(factor - Decimal::ONE),
        None => Rate::ZERO,
    }
}
