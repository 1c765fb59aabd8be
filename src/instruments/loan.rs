//! loan aggregate: emi pricing, disbursal, repayment, foreclosure.

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
use crate::lifecycle::{self, LoanEvent};
use crate::payments::{self, AmortizationSchedule};
use crate::types::{InstrumentId, LoanStatus, LoanType};
use crate::validation;

/// a single amortizing loan.
///
/// the emi is fixed at opening; the reducing balance is recomputed on
/// demand from the closed form rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: InstrumentId,
    pub customer_id: String,
    pub principal: Money,
    pub rate: Rate,
    pub tenure_months: u32,
    pub loan_type: LoanType,
    pub emi_amount: Money,
    pub paid_emis: u32,
    pub open_date: DateTime<Utc>,
    /// set when the principal is actually paid out.
    #[serde(default)]
    pub disbursed_on: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    #[serde(skip)]
    pub events: EventStore,
}

impl Loan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    /// prices a loan and opens it in pending state, validated against
    /// the policy's loan limits.
    pub fn open(
        customer_id: impl Into<String>,
        principal: Money,
        rate: Rate,
        tenure_months: u32,
        loan_type: LoanType,
        policy: &EnginePolicy,
        time: &SafeTimeProvider,
    ) -> Result<Self> {
        Self::builder()
            .customer_id(customer_id)
            .principal(principal)
            .rate(rate)
            .tenure_months(tenure_months)
            .loan_type(loan_type)
            .build(policy, time)
    }

    /// pays the principal out and starts the repayment clock.
    pub fn disburse(&mut self, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();
        let next = lifecycle::loan_transition(self, LoanEvent::Disburse)?;
        self.disbursed_on = Some(now);
        self.events.emit(Event::LoanDisbursed {
            instrument_id: self.id,
            principal: self.principal,
            timestamp: now,
        });
        self.apply_status(next, "principal disbursed", now);
        Ok(())
    }

    /// records one emi payment and returns the reduced outstanding
    /// balance. the final emi closes the loan in the same call.
    pub fn post_emi(&mut self, time: &SafeTimeProvider) -> Result<Money> {
        let now = time.now();
        if self.paid_emis >= self.tenure_months {
            return Err(ValidationError::OutOfRange {
                field: "paid_emis",
                value: Decimal::from(self.paid_emis + 1),
                expected: format!("at most {} emis", self.tenure_months),
            }
            .into());
        }
        let next = lifecycle::loan_transition(self, LoanEvent::EmiPosted)?;

        self.paid_emis += 1;
        let outstanding = self.outstanding_amount();
        self.events.emit(Event::EmiPosted {
            instrument_id: self.id,
            number: self.paid_emis,
            amount: self.emi_amount,
            outstanding,
            timestamp: now,
        });

        if next != self.status {
            self.events.emit(Event::LoanClosed {
                instrument_id: self.id,
                total_repaid: self.emi_amount * Decimal::from(self.tenure_months),
                timestamp: now,
            });
            self.apply_status(next, "fully repaid", now);
        }
        Ok(outstanding)
    }

    /// settles the loan early at the current outstanding balance.
    pub fn foreclose(&mut self, time: &SafeTimeProvider) -> Result<Money> {
        let now = time.now();
        let next = lifecycle::loan_transition(self, LoanEvent::Foreclose)?;

        let settlement = self.outstanding_amount();
        self.events.emit(Event::LoanForeclosed {
            instrument_id: self.id,
            settlement_amount: settlement,
            timestamp: now,
        });
        self.apply_status(next, "foreclosed", now);
        Ok(settlement)
    }

    /// flags the loan as defaulted. terminal, nothing posts after this.
    pub fn mark_defaulted(&mut self, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();
        let next = lifecycle::loan_transition(self, LoanEvent::MarkDefaulted)?;
        self.events.emit(Event::LoanDefaulted {
            instrument_id: self.id,
            outstanding: self.outstanding_amount(),
            timestamp: now,
        });
        self.apply_status(next, "defaulted on emis", now);
        Ok(())
    }

    /// reducing balance after the emis paid so far.
    pub fn outstanding_amount(&self) -> Money {
        payments::outstanding_balance(self.principal, self.rate, self.tenure_months, self.paid_emis)
    }

    /// share of the tenure repaid, as a percentage.
    pub fn progress_percent(&self) -> Decimal {
        payments::repayment_progress(self.paid_emis, self.tenure_months)
    }

    /// full month-by-month amortization schedule, anchored on the
    /// disbursal date when there is one.
    pub fn schedule(&self) -> AmortizationSchedule {
        AmortizationSchedule::generate(
            self.id,
            self.principal,
            self.rate,
            self.tenure_months,
            self.repayment_anchor(),
        )
    }

    /// due date of the next unpaid emi.
    pub fn next_due_date(&self) -> DateTime<Utc> {
        due::next_due_date(self.repayment_anchor(), self.paid_emis)
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn repayment_anchor(&self) -> DateTime<Utc> {
        self.disbursed_on.unwrap_or(self.open_date)
    }

    fn apply_status(&mut self, next: LoanStatus, reason: &str, now: DateTime<Utc>) {
        let old = self.status;
        self.status = next;
        self.events.emit(Event::StatusChanged {
            instrument_id: self.id,
            instrument: "loan".to_string(),
            old_status: format!("{:?}", old),
            new_status: format!("{:?}", next),
            reason: reason.to_string(),
            timestamp: now,
        });
    }
}

/// staged configuration for a [`Loan`].
#[derive(Debug, Default)]
pub struct LoanBuilder {
    customer_id: Option<String>,
    principal: Option<Money>,
    rate: Option<Rate>,
    tenure_months: Option<u32>,
    loan_type: LoanType,
    open_date: Option<DateTime<Utc>>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
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

    pub fn loan_type(mut self, loan_type: LoanType) -> Self {
        self.loan_type = loan_type;
        self
    }

    pub fn open_date(mut self, open_date: DateTime<Utc>) -> Self {
        self.open_date = Some(open_date);
        self
    }

    pub fn build(self, policy: &EnginePolicy, time: &SafeTimeProvider) -> Result<Loan> {
        let customer_id = self.customer_id.ok_or(EngineError::InvalidConfiguration {
            message: "customer_id required".to_string(),
        })?;
        let principal = self.principal.ok_or(EngineError::InvalidConfiguration {
            message: "principal required".to_string(),
        })?;
        let rate = self.rate.ok_or(EngineError::InvalidConfiguration {
            message: "rate required".to_string(),
        })?;
        let tenure_months = self.tenure_months.ok_or(EngineError::InvalidConfiguration {
            message: "tenure_months required".to_string(),
        })?;

        let terms = validation::validate_terms(principal, rate, tenure_months, &policy.loan_limits)?;
        let emi_amount = payments::loan_emi(terms.principal, terms.rate, terms.tenure_months);

        let mut loan = Loan {
            id: Uuid::new_v4(),
            customer_id,
            principal: terms.principal,
            rate: terms.rate,
            tenure_months: terms.tenure_months,
            loan_type: self.loan_type,
            emi_amount,
            paid_emis: 0,
            open_date: self.open_date.unwrap_or_else(|| time.now()),
            disbursed_on: None,
            status: LoanStatus::Pending,
            events: EventStore::new(),
        };
        loan.events.emit(Event::LoanOpened {
            instrument_id: loan.id,
            principal: loan.principal,
            rate: loan.rate,
            emi_amount: loan.emi_amount,
            tenure_months: loan.tenure_months,
        });
        Ok(loan)
    }
}
