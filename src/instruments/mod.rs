pub mod fixed_deposit;
pub mod loan;
pub mod recurring_deposit;

pub use fixed_deposit::{FixedDeposit, FixedDepositBuilder};
pub use loan::{Loan, LoanBuilder};
pub use recurring_deposit::{RecurringDeposit, RecurringDepositBuilder};
