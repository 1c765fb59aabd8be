//! recurring deposit aggregate: monthly installments accumulating to a
//! maturity value, with overdue tracking.

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EnginePolicy;
use crate::decimal::{Money, Rate};
use crate::due;
use crate::errors::{EngineError, Result, ValidationError};
use crate::events::{Event, EventStore};
use crate::interest::{self, InstallmentLedger};
use crate::lifecycle::{self, RdEvent};
use crate::types::{InstrumentId, RdStatus, RdType};
use crate::validation;

/// a single recurring deposit account.
///
/// `total_paid` equals `monthly_amount * paid_installments` under normal
/// operation; the ledger keeps the per-installment record behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDeposit {
    pub id: InstrumentId,
    pub customer_id: String,
    pub monthly_amount: Money,
    pub rate: Rate,
    pub tenure_months: u32,
    pub rd_type: RdType,
    pub auto_debit: bool,
    pub open_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub maturity_amount: Money,
    pub paid_installments: u32,
    pub total_paid: Money,
    pub ledger: InstallmentLedger,
    pub status: RdStatus,
    #[serde(skip)]
    pub events: EventStore,
}

impl RecurringDeposit {
    pub fn builder() -> RecurringDepositBuilder {
        RecurringDepositBuilder::new()
    }

    /// opens a recurring deposit, validated against the policy's
    /// deposit limits.
    pub fn open(
        customer_id: impl Into<String>,
        monthly_amount: Money,
        rate: Rate,
        tenure_months: u32,
        rd_type: RdType,
        policy: &EnginePolicy,
        time: &SafeTimeProvider,
    ) -> Result<Self> {
        Self::builder()
            .customer_id(customer_id)
            .monthly_amount(monthly_amount)
            .rate(rate)
            .tenure_months(tenure_months)
            .rd_type(rd_type)
            .build(policy, time)
    }

    /// records one installment payment.
    ///
    /// posting the final installment on or after the maturity date
    /// settles the deposit as matured in the same call. returns the new
    /// paid count.
    pub fn post_installment(&mut self, time: &SafeTimeProvider) -> Result<u32> {
        let now = time.now();
        if self.paid_installments >= self.tenure_months {
            return Err(ValidationError::OutOfRange {
                field: "paid_installments",
                value: Decimal::from(self.paid_installments + 1),
                expected: format!("at most {} installments", self.tenure_months),
            }
            .into());
        }
        let next = lifecycle::rd_transition(self, RdEvent::InstallmentPosted { now })?;

        self.paid_installments += 1;
        self.total_paid += self.monthly_amount;
        self.ledger.record(self.paid_installments, now, self.monthly_amount);
        self.events.emit(Event::InstallmentPosted {
            instrument_id: self.id,
            number: self.paid_installments,
            amount: self.monthly_amount,
            total_paid: self.total_paid,
            timestamp: now,
        });

        if next != self.status {
            self.events.emit(Event::RdMatured {
                instrument_id: self.id,
                maturity_amount: self.maturity_amount,
                timestamp: now,
            });
            self.apply_status(next, "final installment posted", now);
        }
        Ok(self.paid_installments)
    }

    /// lazily settles maturity against the clock. matures only once all
    /// installments are paid and the maturity date has passed.
    pub fn check_maturity(&mut self, time: &SafeTimeProvider) -> RdStatus {
        let now = time.now();
        if let Ok(next) = lifecycle::rd_transition(self, RdEvent::MaturityCheck { now }) {
            if next != self.status {
                self.events.emit(Event::RdMatured {
                    instrument_id: self.id,
                    maturity_amount: self.maturity_amount,
                    timestamp: now,
                });
                self.apply_status(next, "maturity date reached", now);
            }
        }
        self.status
    }

    /// flags the deposit as defaulted. the overdue threshold policy
    /// lives with the caller; the engine only counts missed dues.
    pub fn mark_defaulted(&mut self, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();
        let next = lifecycle::rd_transition(self, RdEvent::MarkDefaulted)?;
        self.events.emit(Event::RdDefaulted {
            instrument_id: self.id,
            overdue_installments: self.overdue_installments(time),
            timestamp: now,
        });
        self.apply_status(next, "defaulted on installments", now);
        Ok(())
    }

    /// pays the deposit out. a matured deposit settles at the contracted
    /// maturity amount, anything else at the accrued value of what was
    /// actually paid in.
    pub fn close(&mut self, time: &SafeTimeProvider) -> Result<Money> {
        let now = time.now();
        let next = lifecycle::rd_transition(self, RdEvent::Close)?;

        let payout = match self.status {
            RdStatus::Matured => self.maturity_amount,
            _ => self.ledger.accrued_value(self.rate, now),
        };
        self.events.emit(Event::RdClosed {
            instrument_id: self.id,
            payout,
            timestamp: now,
        });
        self.apply_status(next, "paid out", now);
        Ok(payout)
    }

    /// due date of the next unpaid installment.
    pub fn next_due_date(&self) -> DateTime<Utc> {
        due::next_due_date(self.open_date, self.paid_installments)
    }

    pub fn is_overdue(&self, time: &SafeTimeProvider) -> bool {
        due::is_overdue(self.open_date, self.paid_installments, time.now())
    }

    /// installments whose due date has passed without payment.
    pub fn overdue_installments(&self, time: &SafeTimeProvider) -> u32 {
        due::overdue_installments(self.open_date, self.paid_installments, time.now())
    }

    /// value of the paid installments compounded to now.
    pub fn accrued_value(&self, time: &SafeTimeProvider) -> Money {
        self.ledger.accrued_value(self.rate, time.now())
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn apply_status(&mut self, next: RdStatus, reason: &str, now: DateTime<Utc>) {
        let old = self.status;
        self.status = next;
        self.events.emit(Event::StatusChanged {
            instrument_id: self.id,
            instrument: "recurring_deposit".to_string(),
            old_status: format!("{:?}", old),
            new_status: format!("{:?}", next),
            reason: reason.to_string(),
            timestamp: now,
        });
    }
}

/// staged configuration for a [`RecurringDeposit`].
#[derive(Debug, Default)]
pub struct RecurringDepositBuilder {
    customer_id: Option<String>,
    monthly_amount: Option<Money>,
    rate: Option<Rate>,
    tenure_months: Option<u32>,
    rd_type: RdType,
    auto_debit: bool,
    open_date: Option<DateTime<Utc>>,
}

impl RecurringDepositBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn monthly_amount(mut self, monthly_amount: Money) -> Self {
        self.monthly_amount = Some(monthly_amount);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn tenure_months(mut self, tenure_months: u32) -> Self {
        self.tenure_months = Some(tenure_months);
        self
    }

    pub fn rd_type(mut self, rd_type: RdType) -> Self {
        self.rd_type = rd_type;
        self
    }

    pub fn auto_debit(mut self, auto_debit: bool) -> Self {
        self.auto_debit = auto_debit;
        self
    }

    pub fn open_date(mut self, open_date: DateTime<Utc>) -> Self {
        self.open_date = Some(open_date);
        self
    }

    pub fn build(self, policy: &EnginePolicy, time: &SafeTimeProvider) -> Result<RecurringDeposit> {
        let customer_id = self.customer_id.ok_or(EngineError::InvalidConfiguration {
            message: "customer_id required".to_string(),
        })?;
        let monthly_amount = self.monthly_amount.ok_or(EngineError::InvalidConfiguration {
            message: "monthly_amount required".to_string(),
        })?;
        let rate = self.rate.ok_or(EngineError::InvalidConfiguration {
            message: "rate required".to_string(),
        })?;
        let tenure_months = self.tenure_months.ok_or(EngineError::InvalidConfiguration {
            message: "tenure_months required".to_string(),
        })?;

        let terms =
            validation::validate_terms(monthly_amount, rate, tenure_months, &policy.deposit_limits)?;

        let open_date = self.open_date.unwrap_or_else(|| time.now());
        let maturity_date = due::maturity_date(open_date, terms.tenure_months);
        let calc = interest::rd_maturity(terms.principal, terms.rate, terms.tenure_months);

        let mut deposit = RecurringDeposit {
            id: Uuid::new_v4(),
            customer_id,
            monthly_amount: terms.principal,
            rate: terms.rate,
            tenure_months: terms.tenure_months,
            rd_type: self.rd_type,
            auto_debit: self.auto_debit,
            open_date,
            maturity_date,
            maturity_amount: calc.maturity_amount,
            paid_installments: 0,
            total_paid: Money::ZERO,
            ledger: InstallmentLedger::new(),
            status: RdStatus::Active,
            events: EventStore::new(),
        };
        deposit.events.emit(Event::RdOpened {
            instrument_id: deposit.id,
            monthly_amount: deposit.monthly_amount,
            rate: deposit.rate,
            maturity_amount: deposit.maturity_amount,
            first_due_date: deposit.next_due_date(),
        });
        Ok(deposit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn standard_rd(time: &SafeTimeProvider) -> RecurringDeposit {
        RecurringDeposit::open(
            "CUST-001",
            Money::from_major(2_000),
            Rate::from_percentage(dec!(6)),
            12,
            RdType::Regular,
            &EnginePolicy::standard(),
            time,
        )
        .unwrap()
    }

    #[test]
    fn open_quotes_annuity_maturity() {
        let time = test_time();
        let mut rd = standard_rd(&time);

        assert_eq!(rd.status, RdStatus::Active);
        assert_eq!(rd.paid_installments, 0);
        assert_eq!(rd.total_paid, Money::ZERO);
        // 2000/month at 6% over 12 months lands a little over 24.8k
        assert!(rd.maturity_amount > Money::from_major(24_790));
        assert!(rd.maturity_amount < Money::from_major(24_900));
        assert_eq!(
            rd.maturity_date,
            Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
        );

        let events = rd.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::RdOpened { first_due_date, .. } => {
                assert_eq!(
                    *first_due_date,
                    Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap()
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn open_rejects_nonpositive_monthly_amount() {
        let time = test_time();
        let result = RecurringDeposit::open(
            "CUST-001",
            Money::ZERO,
            Rate::from_percentage(dec!(6)),
            12,
            RdType::Regular,
            &EnginePolicy::standard(),
            &time,
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn posting_installments_keeps_the_running_totals() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut rd = standard_rd(&time);
        rd.take_events();

        for expected in 1..=3 {
            control.advance(Duration::days(30));
            let count = rd.post_installment(&time).unwrap();
            assert_eq!(count, expected);
        }

        assert_eq!(rd.paid_installments, 3);
        assert_eq!(rd.total_paid, Money::from_major(6_000));
        assert_eq!(rd.ledger.count(), 3);
        assert_eq!(rd.total_paid, rd.monthly_amount * Decimal::from(rd.paid_installments));

        let events = rd.take_events();
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|e| matches!(e, Event::InstallmentPosted { .. })));
    }

    #[test]
    fn posting_past_the_tenure_is_rejected() {
        let time = test_time();
        let mut rd = RecurringDeposit::open(
            "CUST-002",
            Money::from_major(1_000),
            Rate::from_percentage(dec!(6)),
            3,
            RdType::Regular,
            &EnginePolicy::standard(),
            &time,
        )
        .unwrap();

        // all three paid early, well before the maturity date
        for _ in 0..3 {
            rd.post_installment(&time).unwrap();
        }
        assert_eq!(rd.status, RdStatus::Active);

        let result = rd.post_installment(&time);
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(rd.paid_installments, 3);
    }

    #[test]
    fn final_installment_on_the_maturity_date_matures() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut rd = RecurringDeposit::open(
            "CUST-003",
            Money::from_major(1_000),
            Rate::from_percentage(dec!(6)),
            6,
            RdType::Regular,
            &EnginePolicy::standard(),
            &time,
        )
        .unwrap();

        for _ in 0..6 {
            control.advance(Duration::days(31));
            rd.post_installment(&time).unwrap();
        }

        // 186 days in, past the 2024-07-15 maturity date
        assert_eq!(rd.status, RdStatus::Matured);
        let payout = rd.close(&time).unwrap();
        assert_eq!(payout, rd.maturity_amount);
        assert_eq!(rd.status, RdStatus::Closed);
    }

    #[test]
    fn paid_up_deposit_matures_on_the_date_not_before() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut rd = RecurringDeposit::open(
            "CUST-004",
            Money::from_major(1_000),
            Rate::from_percentage(dec!(6)),
            3,
            RdType::Regular,
            &EnginePolicy::standard(),
            &time,
        )
        .unwrap();

        for _ in 0..3 {
            rd.post_installment(&time).unwrap();
        }
        assert_eq!(rd.check_maturity(&time), RdStatus::Active);

        control.advance(Duration::days(91));
        assert_eq!(rd.check_maturity(&time), RdStatus::Matured);
    }

    #[test]
    fn overdue_counting_follows_the_calendar() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut rd = standard_rd(&time);

        assert!(!rd.is_overdue(&time));
        assert_eq!(rd.overdue_installments(&time), 0);

        // 100 days in: feb, mar and apr dues have all passed
        control.advance(Duration::days(100));
        assert!(rd.is_overdue(&time));
        assert_eq!(rd.overdue_installments(&time), 3);

        rd.post_installment(&time).unwrap();
        assert_eq!(rd.overdue_installments(&time), 2);
    }

    #[test]
    fn defaulted_deposit_settles_at_accrued_value() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut rd = standard_rd(&time);

        rd.post_installment(&time).unwrap();
        control.advance(Duration::days(100));
        rd.mark_defaulted(&time).unwrap();
        assert_eq!(rd.status, RdStatus::Defaulted);

        assert!(matches!(
            rd.post_installment(&time),
            Err(EngineError::Lifecycle(_))
        ));

        let accrued = rd.accrued_value(&time);
        let payout = rd.close(&time).unwrap();
        assert_eq!(payout, accrued);
        // one 2000 installment plus three months of interest
        assert!(payout >= Money::from_major(2_000));
        assert!(payout < Money::from_major(2_100));
    }

    #[test]
    fn early_close_pays_back_flat_when_nothing_accrued() {
        let time = test_time();
        let mut rd = standard_rd(&time);

        rd.post_installment(&time).unwrap();
        rd.post_installment(&time).unwrap();

        let payout = rd.close(&time).unwrap();
        assert_eq!(payout, Money::from_major(4_000));
        assert_eq!(rd.status, RdStatus::Closed);
    }

    #[test]
    fn record_survives_serde_round_trip() {
        let time = test_time();
        let mut rd = standard_rd(&time);
        rd.post_installment(&time).unwrap();
        rd.take_events();

        let json = serde_json::to_string(&rd).unwrap();
        let restored: RecurringDeposit = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, rd.id);
        assert_eq!(restored.paid_installments, 1);
        assert_eq!(restored.total_paid, Money::from_major(2_000));
        assert_eq!(restored.ledger.count(), 1);
        assert_eq!(restored.status, rd.status);
        assert!(restored.events.events().is_empty());
    }
}
