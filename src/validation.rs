use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::ValidationLimits;
use crate::decimal::{Money, Rate};
use crate::errors::ValidationError;

/// normalized instrument terms after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentTerms {
    pub principal: Money,
    pub rate: Rate,
    pub tenure_months: u32,
}

/// parse a raw amount string into money
pub fn parse_amount(field: &'static str, input: &str) -> Result<Money, ValidationError> {
    let value = Decimal::from_str(input.trim()).map_err(|_| ValidationError::NonNumeric {
        field,
        input: input.to_string(),
    })?;
    Ok(Money::from_decimal(value))
}

/// parse a raw percentage string (e.g. "6.5" for 6.5% p.a.) into a rate
pub fn parse_rate(field: &'static str, input: &str) -> Result<Rate, ValidationError> {
    let percent = Decimal::from_str(input.trim()).map_err(|_| ValidationError::NonNumeric {
        field,
        input: input.to_string(),
    })?;
    Ok(Rate::from_percentage(percent))
}

/// parse a raw tenure string into whole months
pub fn parse_tenure(field: &'static str, input: &str) -> Result<u32, ValidationError> {
    let months: i64 = input.trim().parse().map_err(|_| ValidationError::NonNumeric {
        field,
        input: input.to_string(),
    })?;
    if months <= 0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: Decimal::from(months),
            expected: "greater than 0".to_string(),
        });
    }
    u32::try_from(months).map_err(|_| ValidationError::OutOfRange {
        field,
        value: Decimal::from(months),
        expected: format!("at most {} months", u32::MAX),
    })
}

/// check an amount against the configured principal limits
pub fn check_principal(
    field: &'static str,
    amount: Money,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if !amount.is_positive() {
        return Err(ValidationError::OutOfRange {
            field,
            value: amount.as_decimal(),
            expected: "greater than 0".to_string(),
        });
    }
    if let Some(min) = limits.minimum_principal {
        if amount < min {
            return Err(ValidationError::OutOfRange {
                field,
                value: amount.as_decimal(),
                expected: format!("at least {}", min),
            });
        }
    }
    if let Some(max) = limits.maximum_principal {
        if amount > max {
            return Err(ValidationError::OutOfRange {
                field,
                value: amount.as_decimal(),
                expected: format!("at most {}", max),
            });
        }
    }
    Ok(())
}

/// check a rate against the configured ceiling
pub fn check_rate(
    field: &'static str,
    rate: Rate,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if rate.is_negative() || rate > limits.rate_ceiling {
        return Err(ValidationError::OutOfRange {
            field,
            value: rate.as_percentage(),
            expected: format!("between 0% and {}", limits.rate_ceiling),
        });
    }
    Ok(())
}

/// check a tenure against the configured maximum
pub fn check_tenure(
    field: &'static str,
    months: u32,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    if months == 0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: Decimal::ZERO,
            expected: "greater than 0".to_string(),
        });
    }
    if let Some(max) = limits.maximum_tenure_months {
        if months > max {
            return Err(ValidationError::OutOfRange {
                field,
                value: Decimal::from(months),
                expected: format!("at most {} months", max),
            });
        }
    }
    Ok(())
}

/// validate already-typed terms against product limits
pub fn validate_terms(
    principal: Money,
    rate: Rate,
    tenure_months: u32,
    limits: &ValidationLimits,
) -> Result<InstrumentTerms, ValidationError> {
    check_principal("principal", principal, limits)?;
    check_rate("rate", rate, limits)?;
    check_tenure("tenure_months", tenure_months, limits)?;
    Ok(InstrumentTerms {
        principal,
        rate,
        tenure_months,
    })
}

/// parse raw strings and validate them against product limits
pub fn parse_terms(
    principal: &str,
    rate: &str,
    tenure_months: &str,
    limits: &ValidationLimits,
) -> Result<InstrumentTerms, ValidationError> {
    let principal = parse_amount("principal", principal)?;
    let rate = parse_rate("rate", rate)?;
    let tenure = parse_tenure("tenure_months", tenure_months)?;
    validate_terms(principal, rate, tenure, limits)
}
