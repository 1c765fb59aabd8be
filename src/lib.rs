pub mod config;
pub mod decimal;
pub mod due;
pub mod errors;
pub mod events;
pub mod instruments;
pub mod interest;
pub mod lifecycle;
pub mod payments;
pub mod types;
pub mod validation;

// re-export key types
pub use config::{EnginePolicy, ValidationLimits};
pub use decimal::{Money, Rate};
pub use due::{days_to_maturity, next_due_date};
pub use errors::{EngineError, LifecycleError, Result, ValidationError};
pub use events::{Event, EventStore};
pub use instruments::{
    FixedDeposit, FixedDepositBuilder, Loan, LoanBuilder, RecurringDeposit,
    RecurringDepositBuilder,
};
pub use interest::{
    fd_maturity, fd_maturity_value, fd_premature_value, rd_maturity, rd_maturity_value,
    InstallmentEntry, InstallmentLedger, MaturityCalculation,
};
pub use lifecycle::{fd_transition, loan_transition, rd_transition, FdEvent, LoanEvent, RdEvent};
pub use payments::{
    emi_quote, loan_emi, outstanding_balance, repayment_progress, AmortizationSchedule, EmiQuote,
    ScheduledInstallment,
};
pub use types::{FdStatus, FdType, InstrumentId, LoanStatus, LoanType, RdStatus, RdType};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
