use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::due::add_months;
use crate::interest::compound_factor;
use crate::types::InstrumentId;

/// equated monthly installment:
/// P·r·(1+r)^n / ((1+r)^n − 1) with r the monthly rate
pub fn loan_emi(principal: Money, annual_rate: Rate, tenure_months: u32) -> Money {
    if tenure_months == 0 {
        log::warn!("emi requested for zero tenure, returning principal");
        return principal;
    }

    let monthly_rate = annual_rate.monthly_rate();
    if monthly_rate.is_zero() {
        return principal / Decimal::from(tenure_months);
    }

    let emi = compound_factor(monthly_rate, tenure_months).and_then(|factor| {
        let numerator = principal.as_decimal().checked_mul(monthly_rate * factor)?;
        Some(numerator / (factor - Decimal::ONE))
    });

    match emi {
        Some(value) => Money::from_decimal(value),
        None => {
            log::warn!(
                "emi not representable (principal {}, rate {}, tenure {}m), using linear division",
                principal,
                annual_rate,
                tenure_months
            );
            principal / Decimal::from(tenure_months)
        }
    }
}

/// principal still owed after paid_emis installments:
/// P·[(1+r)^n − (1+r)^p] / [(1+r)^n − 1]
pub fn outstanding_balance(
    principal: Money,
    annual_rate: Rate,
    tenure_months: u32,
    paid_emis: u32,
) -> Money {
    if tenure_months == 0 || paid_emis >= tenure_months {
        return Money::ZERO;
    }

    let monthly_rate = annual_rate.monthly_rate();
    let remaining_linear =
        principal * Decimal::from(tenure_months - paid_emis) / Decimal::from(tenure_months);

    if monthly_rate.is_zero() {
        return remaining_linear;
    }

    let balance = compound_factor(monthly_rate, tenure_months).and_then(|factor_n| {
        let factor_p = compound_factor(monthly_rate, paid_emis)?;
        let owed = principal
            .as_decimal()
            .checked_mul(factor_n - factor_p)?;
        Some(owed / (factor_n - Decimal::ONE))
    });

    match balance {
        Some(value) => Money::from_decimal(value),
        None => {
            log::warn!(
                "outstanding balance not representable (principal {}, rate {}), using linear remainder",
                principal,
                annual_rate
            );
            remaining_linear
        }
    }
}

/// repaid share of the term as a display percentage
pub fn repayment_progress(paid_emis: u32, tenure_months: u32) -> Decimal {
    if tenure_months == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(paid_emis.min(tenure_months)) / Decimal::from(tenure_months) * dec!(100))
        .round_dp(2)
}

/// emi with the total cost of the loan split out
#[derive(Debug, Clone, PartialEq)]
pub struct EmiQuote {
    pub emi: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

/// quote the emi and total interest for a prospective loan
pub fn emi_quote(principal: Money, annual_rate: Rate, tenure_months: u32) -> EmiQuote {
    let emi = loan_emi(principal, annual_rate, tenure_months);
    let total_payable = emi * Decimal::from(tenure_months);
    EmiQuote {
        emi,
        total_payable,
        total_interest: total_payable - principal,
    }
}

/// one row of an amortization schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    pub number: u32,
    pub due_date: DateTime<Utc>,
    pub opening_balance: Money,
    pub emi: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub closing_balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
}

/// full month-by-month repayment table for a loan
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    pub loan_id: InstrumentId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub start_date: DateTime<Utc>,
    pub installments: Vec<ScheduledInstallment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the schedule; the final row absorbs rounding drift so the
    /// balance lands on exactly zero
    pub fn generate(
        loan_id: InstrumentId,
        principal: Money,
        annual_rate: Rate,
        tenure_months: u32,
        start_date: DateTime<Utc>,
    ) -> Self {
        let monthly_rate = annual_rate.monthly_rate();
        let emi = loan_emi(principal, annual_rate, tenure_months);

        let mut installments = Vec::with_capacity(tenure_months as usize);
        let mut balance = principal;
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for number in 1..=tenure_months {
            let due_date = add_months(start_date, number);
            let interest_component = Money::from_decimal(balance.as_decimal() * monthly_rate);
            let principal_component = emi - interest_component;

            cumulative_interest += interest_component;
            cumulative_principal += principal_component;

            let closing_balance = (balance - principal_component).max(Money::ZERO);

            installments.push(ScheduledInstallment {
                number,
                due_date,
                opening_balance: balance,
                emi,
                principal_component,
                interest_component,
                closing_balance,
                cumulative_principal,
                cumulative_interest,
            });

            balance = closing_balance;
        }

        if let Some(last) = installments.last_mut() {
            if last.closing_balance > Money::ZERO && last.closing_balance < Money::from_major(1) {
                last.principal_component += last.closing_balance;
                last.emi += last.closing_balance;
                last.cumulative_principal += last.closing_balance;
                last.closing_balance = Money::ZERO;
            }
        }

        let total_interest = installments
            .iter()
            .map(|i| i.interest_component)
            .fold(Money::ZERO, |acc, x| acc + x);
        let total_payment = installments
            .iter()
            .map(|i| i.emi)
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            loan_id,
            principal,
            annual_rate,
            tenure_months,
            start_date,
            installments,
            total_interest,
            total_payment,
        }
    }

    /// row for a specific installment number
    pub fn installment(&self, number: u32) -> Option<&ScheduledInstallment> {
        if number == 0 {
            return None;
        }
        self.installments.get((number - 1) as usize)
    }

    /// balance owed after a given installment has been paid
    pub fn balance_after(&self, number: u32) -> Money {
        self.installment(number)
            .map(|i| i.closing_balance)
            .unwrap_or(self.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_emi_standard_loan() {
        // 5,00,000 at 12% over 60 months
        let emi = loan_emi(
            Money::from_major(500_000),
            Rate::from_percentage(dec!(12)),
            60,
        );
        assert!(emi > Money::from_major(11_122));
        assert!(emi < Money::from_major(11_123));
    }

    #[test]
    fn test_emi_zero_rate_divides_evenly() {
        let emi = loan_emi(Money::from_major(120_000), Rate::ZERO, 24);
        assert_eq!(emi, Money::from_major(5_000));
    }

    #[test]
    fn test_emi_total_exceeds_principal() {
        for (amount, pct, months) in [
            (100_000, dec!(8.5), 12),
            (500_000, dec!(12), 60),
            (2_500_000, dec!(9.25), 240),
        ] {
            let principal = Money::from_major(amount);
            let emi = loan_emi(principal, Rate::from_percentage(pct), months);
            let repaid = emi * Decimal::from(months);
            assert!(
                repaid > principal,
                "total repaid {} not above principal {}",
                repaid,
                principal
            );
        }
    }

    #[test]
    fn test_outstanding_boundaries() {
        let principal = Money::from_major(500_000);
        let rate = Rate::from_percentage(dec!(12));

        assert_eq!(outstanding_balance(principal, rate, 60, 0), principal);
        assert_eq!(outstanding_balance(principal, rate, 60, 60), Money::ZERO);
        assert_eq!(outstanding_balance(principal, rate, 60, 61), Money::ZERO);
    }

    #[test]
    fn test_outstanding_decreases_monotonically() {
        let principal = Money::from_major(500_000);
        let rate = Rate::from_percentage(dec!(12));

        let mut previous = outstanding_balance(principal, rate, 60, 0);
        for paid in 1..=60 {
            let current = outstanding_balance(principal, rate, 60, paid);
            assert!(
                current < previous,
                "balance did not fall at installment {}",
                paid
            );
            previous = current;
        }
    }

    #[test]
    fn test_outstanding_zero_rate_is_linear() {
        let principal = Money::from_major(120_000);
        assert_eq!(
            outstanding_balance(principal, Rate::ZERO, 24, 6),
            Money::from_major(90_000)
        );
    }

    #[test]
    fn test_repayment_progress() {
        assert_eq!(repayment_progress(0, 60), Decimal::ZERO);
        assert_eq!(repayment_progress(15, 60), dec!(25.00));
        assert_eq!(repayment_progress(60, 60), dec!(100.00));
        assert_eq!(repayment_progress(70, 60), dec!(100.00));
        assert_eq!(repayment_progress(1, 3), dec!(33.33));
    }

    #[test]
    fn test_emi_quote_totals() {
        let quote = emi_quote(
            Money::from_major(500_000),
            Rate::from_percentage(dec!(12)),
            60,
        );
        assert_eq!(quote.total_payable, quote.emi * dec!(60));
        assert_eq!(
            quote.total_interest,
            quote.total_payable - Money::from_major(500_000)
        );
        assert!(quote.total_interest.is_positive());
    }

    #[test]
    fn test_schedule_runs_to_zero() {
        let schedule = AmortizationSchedule::generate(
            Uuid::new_v4(),
            Money::from_major(500_000),
            Rate::from_percentage(dec!(12)),
            60,
            date(2024, 1, 15),
        );

        assert_eq!(schedule.installments.len(), 60);

        let first = &schedule.installments[0];
        assert_eq!(first.opening_balance, Money::from_major(500_000));
        assert_eq!(first.due_date, date(2024, 2, 15));
        // first month's interest on 5,00,000 at 1% monthly
        assert_eq!(first.interest_component, Money::from_major(5_000));

        let last = schedule.installments.last().unwrap();
        assert_eq!(last.closing_balance, Money::ZERO);
        assert_eq!(last.due_date, date(2029, 1, 15));

        assert_eq!(
            schedule.total_payment,
            schedule.total_interest + Money::from_major(500_000)
        );
    }

    #[test]
    fn test_schedule_matches_closed_form() {
        let principal = Money::from_major(500_000);
        let rate = Rate::from_percentage(dec!(12));
        let schedule =
            AmortizationSchedule::generate(Uuid::new_v4(), principal, rate, 60, date(2024, 1, 1));

        for paid in [1, 12, 30, 59] {
            let tabulated = schedule.balance_after(paid);
            let closed_form = outstanding_balance(principal, rate, 60, paid);
            assert!(
                (tabulated - closed_form).abs() < Money::from_major(1),
                "installment {}: schedule {} vs formula {}",
                paid,
                tabulated,
                closed_form
            );
        }
    }

    #[test]
    fn test_schedule_lookup() {
        let schedule = AmortizationSchedule::generate(
            Uuid::new_v4(),
            Money::from_major(100_000),
            Rate::from_percentage(dec!(10)),
            12,
            date(2024, 1, 1),
        );

        assert!(schedule.installment(0).is_none());
        assert_eq!(schedule.installment(1).unwrap().number, 1);
        assert!(schedule.installment(13).is_none());
        assert_eq!(schedule.balance_after(0), Money::from_major(100_000));
    }
}
