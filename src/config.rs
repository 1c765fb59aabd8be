use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// range limits applied when validating instrument inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationLimits {
    /// highest annual rate the product accepts
    pub rate_ceiling: Rate,
    pub minimum_principal: Option<Money>,
    pub maximum_principal: Option<Money>,
    pub maximum_tenure_months: Option<u32>,
}

impl ValidationLimits {
    /// limits for deposit products (fd and rd)
    pub fn deposits() -> Self {
        Self {
            rate_ceiling: Rate::from_percentage(dec!(15)),
            minimum_principal: None,
            maximum_principal: None,
            maximum_tenure_months: Some(120),
        }
    }

    /// limits for loan products
    pub fn loans() -> Self {
        Self {
            rate_ceiling: Rate::from_percentage(dec!(50)),
            minimum_principal: None,
            maximum_principal: None,
            maximum_tenure_months: Some(360),
        }
    }
}

/// engine-wide policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginePolicy {
    pub deposit_limits: ValidationLimits,
    pub loan_limits: ValidationLimits,
    /// rate reduction applied when a deposit closes before maturity
    pub premature_penalty: Rate,
    /// rate bonus for senior-citizen deposit variants
    pub senior_citizen_bonus: Rate,
    /// months a tax-saver fd refuses premature closure
    pub tax_saver_lock_in_months: u32,
}

impl EnginePolicy {
    /// standard policy: 100 bps premature penalty, 50 bps senior bonus,
    /// 60-month tax-saver lock-in
    pub fn standard() -> Self {
        Self {
            deposit_limits: ValidationLimits::deposits(),
            loan_limits: ValidationLimits::loans(),
            premature_penalty: Rate::from_bps(100),
            senior_citizen_bonus: Rate::from_bps(50),
            tax_saver_lock_in_months: 60,
        }
    }

    /// card rate plus the senior-citizen bonus
    pub fn senior_rate(&self, base: Rate) -> Rate {
        Rate::from_decimal(base.as_decimal() + self.senior_citizen_bonus.as_decimal())
    }
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self::standard()
    }
}
