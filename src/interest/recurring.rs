use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::due::months_elapsed;
use crate::interest::{compound_factor, MaturityCalculation};

/// rd maturity value as the future value of an annuity-due:
/// m × [((1+r)^n − 1) / r] × (1+r) with r the monthly rate
pub fn rd_maturity_value(monthly_amount: Money, annual_rate: Rate, tenure_months: u32) -> Money {
    let monthly_rate = annual_rate.monthly_rate();

    if monthly_rate.is_zero() {
        return monthly_amount * Decimal::from(tenure_months);
    }

    let value = compound_factor(monthly_rate, tenure_months).and_then(|factor| {
        let annuity = (factor - Decimal::ONE) / monthly_rate * (Decimal::ONE + monthly_rate);
        monthly_amount.as_decimal().checked_mul(annuity)
    });

    match value {
        Some(v) => Money::from_decimal(v),
        None => {
            log::warn!(
                "rd maturity not representable (monthly {}, rate {}, tenure {}m), returning 0",
                monthly_amount,
                annual_rate,
                tenure_months
            );
            Money::ZERO
        }
    }
}

/// rd maturity projection with the interest split out
pub fn rd_maturity(
    monthly_amount: Money,
    annual_rate: Rate,
    tenure_months: u32,
) -> MaturityCalculation {
    let invested = monthly_amount * Decimal::from(tenure_months);
    let maturity_amount = rd_maturity_value(monthly_amount, annual_rate, tenure_months);
    MaturityCalculation {
        invested,
        maturity_amount,
        interest_earned: maturity_amount - invested,
    }
}

/// a single posted installment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentEntry {
    pub number: u32,
    pub paid_on: DateTime<Utc>,
    pub amount: Money,
}

/// record of every installment posted against a recurring deposit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentLedger {
    entries: Vec<InstallmentEntry>,
}

impl InstallmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// append a posted installment
    pub fn record(&mut self, number: u32, paid_on: DateTime<Utc>, amount: Money) {
        self.entries.push(InstallmentEntry {
            number,
            paid_on,
            amount,
        });
    }

    pub fn entries(&self) -> &[InstallmentEntry] {
        &self.entries
    }

    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// sum of all posted installment amounts
    pub fn total_paid(&self) -> Money {
        self.entries
            .iter()
            .map(|e| e.amount)
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    /// value of the posted installments with each one compounded monthly
    /// for the months it has been held
    pub fn accrued_value(&self, annual_rate: Rate, now: DateTime<Utc>) -> Money {
        let monthly_rate = annual_rate.monthly_rate();
        let mut total = Money::ZERO;
        for entry in &self.entries {
            let held = months_elapsed(entry.paid_on, now);
            let grown = compound_factor(monthly_rate, held)
                .and_then(|f| entry.amount.as_decimal().checked_mul(f));
            match grown {
                Some(v) => total += Money::from_decimal(v),
                None => {
                    log::warn!(
                        "accrued value not representable for installment {}, using face amount",
                        entry.number
                    );
                    total += entry.amount;
                }
            }
        }
        total
    }
}
