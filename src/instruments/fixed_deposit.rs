//! fixed deposit aggregate: open, mature, premature close, renew.

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EnginePolicy;
use crate::decimal::{Money, Rate};
use crate::due;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::interest;
use crate::lifecycle::{self, FdEvent};
use crate::types::{FdStatus, FdType, InstrumentId};
use crate::validation;

/// a single fixed deposit account.
///
/// the maturity figures are computed once at opening and stored on the
/// record so downstream consumers never recompute them. status changes
/// go through [`lifecycle::fd_transition`] and leave an event trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDeposit {
    pub id: InstrumentId,
    pub customer_id: String,
    pub principal: Money,
    pub rate: Rate,
    pub tenure_months: u32,
    pub fd_type: FdType,
    pub auto_renewal: bool,
    pub nominee_name: Option<String>,
    pub nominee_relation: Option<String>,
    pub open_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub maturity_amount: Money,
    /// settlement figure fixed at premature closure, absent otherwise.
    #[serde(default)]
    pub settlement_amount: Option<Money>,
    pub status: FdStatus,
    #[serde(skip)]
    pub events: EventStore,
}

impl FixedDeposit {
    pub fn builder() -> FixedDepositBuilder {
        FixedDepositBuilder::new()
    }

    /// opens a deposit with the given terms, validated against the
    /// policy's deposit limits.
    pub fn open(
        customer_id: impl Into<String>,
        principal: Money,
        rate: Rate,
        tenure_months: u32,
        fd_type: FdType,
        policy: &EnginePolicy,
        time: &SafeTimeProvider,
    ) -> Result<Self> {
        Self::builder()
            .customer_id(customer_id)
            .principal(principal)
            .rate(rate)
            .tenure_months(tenure_months)
            .fd_type(fd_type)
            .build(policy, time)
    }

    /// lazily settles maturity against the clock. safe to call any
    /// number of times from any status.
    pub fn check_maturity(&mut self, time: &SafeTimeProvider) -> FdStatus {
        let now = time.now();
        if let Ok(next) = lifecycle::fd_transition(self, FdEvent::MaturityCheck { now }) {
            if next != self.status {
                self.events.emit(Event::FdMatured {
                    instrument_id: self.id,
                    maturity_amount: self.maturity_amount,
                    timestamp: now,
                });
                self.apply_status(next, "maturity date reached", now);
            }
        }
        self.status
    }

    /// closes the deposit before maturity at a penalised rate.
    ///
    /// the effective rate drops by the policy penalty and interest is
    /// recomputed over completed quarters only. tax-saver deposits
    /// refuse this inside their lock-in window.
    pub fn premature_close(
        &mut self,
        policy: &EnginePolicy,
        time: &SafeTimeProvider,
    ) -> Result<Money> {
        let now = time.now();
        let next = lifecycle::fd_transition(self, FdEvent::PrematureClose)?;

        if self.fd_type == FdType::TaxSaver {
            let held = due::months_elapsed(self.open_date, now);
            if held < policy.tax_saver_lock_in_months {
                return Err(EngineError::OperationNotSupported {
                    message: format!(
                        "tax saver deposit is locked in for {} months ({} elapsed)",
                        policy.tax_saver_lock_in_months, held
                    ),
                });
            }
        }

        let elapsed = due::months_elapsed(self.open_date, now);
        let settlement =
            interest::fd_premature_value(self.principal, self.rate, policy.premature_penalty, elapsed);
        let effective_rate = self.rate.reduced_by(policy.premature_penalty);

        self.settlement_amount = Some(settlement);
        self.events.emit(Event::FdPrematurelyClosed {
            instrument_id: self.id,
            settlement_amount: settlement,
            effective_rate,
            timestamp: now,
        });
        self.apply_status(next, "closed before maturity", now);
        Ok(settlement)
    }

    /// pays out a matured or prematurely closed deposit.
    pub fn close(&mut self, time: &SafeTimeProvider) -> Result<Money> {
        let now = time.now();
        let next = lifecycle::fd_transition(self, FdEvent::Close)?;

        let payout = match self.status {
            FdStatus::PrematureClosed => self.settlement_amount.unwrap_or(self.principal),
            _ => self.maturity_amount,
        };
        self.events.emit(Event::FdClosed {
            instrument_id: self.id,
            payout,
            timestamp: now,
        });
        self.apply_status(next, "paid out", now);
        Ok(payout)
    }

    /// rolls a matured deposit into a fresh one on the same terms.
    ///
    /// the new deposit opens on the old maturity date with the old
    /// maturity amount as principal. requires `auto_renewal`; a deposit
    /// closed before maturity settles at its penalised figure instead.
    pub fn renew(&mut self, policy: &EnginePolicy, time: &SafeTimeProvider) -> Result<Self> {
        let now = time.now();
        let next = lifecycle::fd_transition(self, FdEvent::Renew)?;

        if !self.auto_renewal {
            return Err(EngineError::OperationNotSupported {
                message: "renewal requires the auto_renewal flag".to_string(),
            });
        }

        let mut renewed = Self::builder()
            .customer_id(self.customer_id.clone())
            .principal(self.maturity_amount)
            .rate(self.rate)
            .tenure_months(self.tenure_months)
            .fd_type(self.fd_type)
            .auto_renewal(true)
            .open_date(self.maturity_date)
            .build(policy, time)?;
        renewed.nominee_name = self.nominee_name.clone();
        renewed.nominee_relation = self.nominee_relation.clone();
        renewed.events.emit(Event::FdRenewed {
            instrument_id: renewed.id,
            renewed_from: self.id,
            principal: renewed.principal,
            timestamp: now,
        });

        self.events.emit(Event::FdClosed {
            instrument_id: self.id,
            payout: Money::ZERO,
            timestamp: now,
        });
        self.apply_status(next, "rolled into renewal", now);
        Ok(renewed)
    }

    /// whole days left until maturity, zero once matured.
    pub fn days_to_maturity(&self, time: &SafeTimeProvider) -> i64 {
        due::days_to_maturity(self.maturity_date, time.now())
    }

    /// annualized yield of the contracted quarterly compounding.
    pub fn effective_yield(&self) -> Rate {
        interest::annualized_yield(self.rate)
    }

    /// interest the deposit will earn if held to maturity.
    pub fn interest_earned(&self) -> Money {
        self.maturity_amount - self.principal
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn apply_status(&mut self, next: FdStatus, reason: &str, now: DateTime<Utc>) {
        let old = self.status;
        self.status = next;
        self.events.emit(Event::StatusChanged {
            instrument_id: self.id,
            instrument: "fixed_deposit".to_string(),
            old_status: format!("{:?}", old),
            new_status: format!("{:?}", next),
            reason: reason.to_string(),
            timestamp: now,
        });
    }
}

/// staged configuration for a [`FixedDeposit`].
#[derive(Debug, Default)]
pub struct FixedDepositBuilder {
    customer_id: Option<String>,
    principal: Option<Money>,
    rate: Option<Rate>,
    tenure_months: Option<u32>,
    fd_type: FdType,
    auto_renewal: bool,
    nominee_name: Option<String>,
    nominee_relation: Option<String>,
    open_date: Option<DateTime<Utc>>,
}

impl FixedDepositBuilder {
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

    pub fn fd_type(mut self, fd_type: FdType) -> Self {
        self.fd_type = fd_type;
        self
    }

    pub fn auto_renewal(mut self, auto_renewal: bool) -> Self {
        self.auto_renewal = auto_renewal;
        self
    }

    pub fn nominee(mut self, name: impl Into<String>, relation: impl Into<String>) -> Self {
        self.nominee_name = Some(name.into());
        self.nominee_relation = Some(relation.into());
        self
    }

    /// backdates the opening, used when renewing at the old maturity date.
    pub fn open_date(mut self, open_date: DateTime<Utc>) -> Self {
        self.open_date = Some(open_date);
        self
    }

    pub fn build(self, policy: &EnginePolicy, time: &SafeTimeProvider) -> Result<FixedDeposit> {
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

        let terms = validation::validate_terms(principal, rate, tenure_months, &policy.deposit_limits)?;

        let open_date = self.open_date.unwrap_or_else(|| time.now());
        let maturity_date = due::maturity_date(open_date, terms.tenure_months);
        let calc = interest::fd_maturity(terms.principal, terms.rate, terms.tenure_months);

        let mut deposit = FixedDeposit {
            id: Uuid::new_v4(),
            customer_id,
            principal: terms.principal,
            rate: terms.rate,
            tenure_months: terms.tenure_months,
            fd_type: self.fd_type,
            auto_renewal: self.auto_renewal,
            nominee_name: self.nominee_name,
            nominee_relation: self.nominee_relation,
            open_date,
            maturity_date,
            maturity_amount: calc.maturity_amount,
            settlement_amount: None,
            status: FdStatus::Active,
            events: EventStore::new(),
        };
        deposit.events.emit(Event::FdOpened {
            instrument_id: deposit.id,
            principal: deposit.principal,
            rate: deposit.rate,
            maturity_amount: deposit.maturity_amount,
            maturity_date: deposit.maturity_date,
        });
        Ok(deposit)
    }
}
