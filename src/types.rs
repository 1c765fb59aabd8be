use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for an instrument record
pub type InstrumentId = Uuid;

/// fixed deposit product variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FdType {
    #[default]
    Regular,
    /// earns the senior-citizen rate bonus
    SeniorCitizen,
    /// 60-month lock-in, no premature closure
    TaxSaver,
    Flexi,
}

/// recurring deposit product variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RdType {
    #[default]
    Regular,
    SeniorCitizen,
    Flexi,
}

/// loan product variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    #[default]
    Personal,
    Home,
    Vehicle,
    Gold,
    Education,
    Business,
}

/// fixed deposit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FdStatus {
    /// deposit running, maturity date in the future
    Active,
    /// maturity date reached, payout not yet settled
    Matured,
    /// closed before maturity at a penalty rate
    PrematureClosed,
    /// settled and closed, terminal
    Closed,
}

impl FdStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FdStatus::Closed)
    }
}

/// recurring deposit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RdStatus {
    /// installments being collected
    Active,
    /// all installments paid and maturity date reached
    Matured,
    /// settled and closed, terminal
    Closed,
    /// caller marked the deposit defaulted on overdue installments
    Defaulted,
}

impl RdStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RdStatus::Closed)
    }
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// sanctioned but not yet disbursed
    Pending,
    /// disbursed and repaying
    Active,
    /// fully repaid or foreclosed, terminal
    Closed,
    /// caller-supplied delinquency signal, terminal
    Defaulted,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Closed | LoanStatus::Defaulted)
    }
}
