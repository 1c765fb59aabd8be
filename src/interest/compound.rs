use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::interest::{compound_factor, MaturityCalculation};

/// fd maturity value under quarterly compounding:
/// principal × (1 + rate/4)^(tenure_months/3)
pub fn fd_maturity_value(principal: Money, annual_rate: Rate, tenure_months: u32) -> Money {
    let quarterly_rate = annual_rate.quarterly_rate();

    let factor = if tenure_months % 3 == 0 {
        compound_factor(quarterly_rate, tenure_months / 3)
    } else {
        fractional_quarter_factor(quarterly_rate, tenure_months)
    };

    match factor.and_then(|f| principal.as_decimal().checked_mul(f)) {
        Some(value) => Money::from_decimal(value),
        None => {
            log::warn!(
                "fd maturity not representable (principal {}, rate {}, tenure {}m), returning 0",
                principal,
                annual_rate,
                tenure_months
            );
            Money::ZERO
        }
    }
}

/// fd maturity projection with the interest split out
pub fn fd_maturity(principal: Money, annual_rate: Rate, tenure_months: u32) -> MaturityCalculation {
    let maturity_amount = fd_maturity_value(principal, annual_rate, tenure_months);
    MaturityCalculation {
        invested: principal,
        maturity_amount,
        interest_earned: maturity_amount - principal,
    }
}

/// settlement value for an fd closed before maturity: the contracted rate
/// less the penalty, compounded over completed quarters only
pub fn fd_premature_value(
    principal: Money,
    contracted_rate: Rate,
    penalty: Rate,
    elapsed_months: u32,
) -> Money {
    let completed_quarters = elapsed_months / 3;
    if completed_quarters == 0 {
        return principal;
    }

    let effective = contracted_rate.reduced_by(penalty);
    match compound_factor(effective.quarterly_rate(), completed_quarters)
        .and_then(|f| principal.as_decimal().checked_mul(f))
    {
        Some(value) => Money::from_decimal(value),
        None => {
            log::warn!(
                "premature settlement not representable (principal {}, rate {}), refunding principal",
                principal,
                effective
            );
            principal
        }
    }
}

/// quarterly factor for tenures not divisible by three, via fractional exponent
fn fractional_quarter_factor(quarterly_rate: Decimal, tenure_months: u32) -> Option<Decimal> {
    let base = Decimal::ONE + quarterly_rate;
    if base <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    let exponent = Decimal::from(tenure_months) / dec!(3);
    base.checked_powd(exponent)
}
