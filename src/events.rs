use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::InstrumentId;

/// all events the engine emits; the audit trail consumes these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // fixed deposit events
    FdOpened {
        instrument_id: InstrumentId,
        principal: Money,
        rate: Rate,
        maturity_amount: Money,
        maturity_date: DateTime<Utc>,
    },
    FdMatured {
        instrument_id: InstrumentId,
        maturity_amount: Money,
        timestamp: DateTime<Utc>,
    },
    FdPrematurelyClosed {
        instrument_id: InstrumentId,
        settlement_amount: Money,
        effective_rate: Rate,
        timestamp: DateTime<Utc>,
    },
    FdClosed {
        instrument_id: InstrumentId,
        payout: Money,
        timestamp: DateTime<Utc>,
    },
    FdRenewed {
        instrument_id: InstrumentId,
        renewed_from: InstrumentId,
        principal: Money,
        timestamp: DateTime<Utc>,
    },

    // recurring deposit events
    RdOpened {
        instrument_id: InstrumentId,
        monthly_amount: Money,
        rate: Rate,
        maturity_amount: Money,
        first_due_date: DateTime<Utc>,
    },
    InstallmentPosted {
        instrument_id: InstrumentId,
        number: u32,
        amount: Money,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
    RdMatured {
        instrument_id: InstrumentId,
        maturity_amount: Money,
        timestamp: DateTime<Utc>,
    },
    RdDefaulted {
        instrument_id: InstrumentId,
        overdue_installments: u32,
        timestamp: DateTime<Utc>,
    },
    RdClosed {
        instrument_id: InstrumentId,
        payout: Money,
        timestamp: DateTime<Utc>,
    },

    // loan events
    LoanOpened {
        instrument_id: InstrumentId,
        principal: Money,
        rate: Rate,
        emi_amount: Money,
        tenure_months: u32,
    },
    LoanDisbursed {
        instrument_id: InstrumentId,
        principal: Money,
        timestamp: DateTime<Utc>,
    },
    EmiPosted {
        instrument_id: InstrumentId,
        number: u32,
        amount: Money,
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },
    LoanForeclosed {
        instrument_id: InstrumentId,
        settlement_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDefaulted {
        instrument_id: InstrumentId,
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },
    LoanClosed {
        instrument_id: InstrumentId,
        total_repaid: Money,
        timestamp: DateTime<Utc>,
    },

    // status change events
    StatusChanged {
        instrument_id: InstrumentId,
        instrument: String,
        old_status: String,
        new_status: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
