pub mod amortization;

pub use amortization::{
    emi_quote, loan_emi, outstanding_balance, repayment_progress, AmortizationSchedule, EmiQuote,
    ScheduledInstallment,
};
