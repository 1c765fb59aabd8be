//! per-product status machines. every status change in the crate is
//! decided here; aggregates apply the result, never set status ad hoc.

use chrono::{DateTime, Utc};

use crate::errors::LifecycleError;
use crate::instruments::{FixedDeposit, Loan, RecurringDeposit};
use crate::types::{FdStatus, LoanStatus, RdStatus};

/// events a fixed deposit can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdEvent {
    /// lazy time-based check against the maturity date
    MaturityCheck { now: DateTime<Utc> },
    /// explicit closure before the maturity date
    PrematureClose,
    /// roll-over of a matured deposit into a fresh one
    Renew,
    /// explicit settlement of a matured or prematurely closed deposit
    Close,
}

impl FdEvent {
    fn name(&self) -> &'static str {
        match self {
            FdEvent::MaturityCheck { .. } => "maturity_check",
            FdEvent::PrematureClose => "premature_close",
            FdEvent::Renew => "renew",
            FdEvent::Close => "close",
        }
    }
}

/// events a recurring deposit can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdEvent {
    /// lazy time-based check against the maturity date
    MaturityCheck { now: DateTime<Utc> },
    /// an installment is being posted now
    InstallmentPosted { now: DateTime<Utc> },
    /// caller-supplied default signal
    MarkDefaulted,
    /// explicit settlement from any live state
    Close,
}

impl RdEvent {
    fn name(&self) -> &'static str {
        match self {
            RdEvent::MaturityCheck { .. } => "maturity_check",
            RdEvent::InstallmentPosted { .. } => "post_installment",
            RdEvent::MarkDefaulted => "mark_defaulted",
            RdEvent::Close => "close",
        }
    }
}

/// events a loan can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanEvent {
    /// sanctioned amount paid out to the borrower
    Disburse,
    /// an emi is being posted now
    EmiPosted,
    /// caller-supplied delinquency signal
    MarkDefaulted,
    /// early settlement of the full outstanding balance
    Foreclose,
}

impl LoanEvent {
    fn name(&self) -> &'static str {
        match self {
            LoanEvent::Disburse => "disburse",
            LoanEvent::EmiPosted => "post_emi",
            LoanEvent::MarkDefaulted => "mark_defaulted",
            LoanEvent::Foreclose => "foreclose",
        }
    }
}

/// next status for a fixed deposit, or an error when the event is illegal
/// from the current status. maturity checks are idempotent and never fail.
pub fn fd_transition(fd: &FixedDeposit, event: FdEvent) -> Result<FdStatus, LifecycleError> {
    match (fd.status, event) {
        (FdStatus::Active, FdEvent::MaturityCheck { now }) => {
            if now >= fd.maturity_date {
                Ok(FdStatus::Matured)
            } else {
                Ok(FdStatus::Active)
            }
        }
        // re-checking a settled deposit is a no-op, never a regression
        (status, FdEvent::MaturityCheck { .. }) => Ok(status),

        (FdStatus::Active, FdEvent::PrematureClose) => Ok(FdStatus::PrematureClosed),

        // a penalised settlement never rolls over
        (FdStatus::Matured, FdEvent::Renew) => Ok(FdStatus::Closed),

        (FdStatus::Matured, FdEvent::Close) | (FdStatus::PrematureClosed, FdEvent::Close) => {
            Ok(FdStatus::Closed)
        }

        (status, event) => Err(illegal("fixed_deposit", status, event.name())),
    }
}

/// next status for a recurring deposit
pub fn rd_transition(rd: &RecurringDeposit, event: RdEvent) -> Result<RdStatus, LifecycleError> {
    match (rd.status, event) {
        (RdStatus::Active, RdEvent::MaturityCheck { now }) => {
            if rd.paid_installments == rd.tenure_months && now >= rd.maturity_date {
                Ok(RdStatus::Matured)
            } else {
                Ok(RdStatus::Active)
            }
        }
        (status, RdEvent::MaturityCheck { .. }) => Ok(status),

        (RdStatus::Active, RdEvent::InstallmentPosted { now }) => {
            if rd.paid_installments + 1 == rd.tenure_months && now >= rd.maturity_date {
                Ok(RdStatus::Matured)
            } else {
                Ok(RdStatus::Active)
            }
        }

        (RdStatus::Active, RdEvent::MarkDefaulted) => Ok(RdStatus::Defaulted),

        // closeable from any live state
        (RdStatus::Active, RdEvent::Close)
        | (RdStatus::Matured, RdEvent::Close)
        | (RdStatus::Defaulted, RdEvent::Close) => Ok(RdStatus::Closed),

        (status, event) => Err(illegal("recurring_deposit", status, event.name())),
    }
}

/// next status for a loan
pub fn loan_transition(loan: &Loan, event: LoanEvent) -> Result<LoanStatus, LifecycleError> {
    match (loan.status, event) {
        (LoanStatus::Pending, LoanEvent::Disburse) => Ok(LoanStatus::Active),

        (LoanStatus::Active, LoanEvent::EmiPosted) => {
            if loan.paid_emis + 1 >= loan.tenure_months {
                Ok(LoanStatus::Closed)
            } else {
                Ok(LoanStatus::Active)
            }
        }

        (LoanStatus::Active, LoanEvent::MarkDefaulted) => Ok(LoanStatus::Defaulted),

        (LoanStatus::Active, LoanEvent::Foreclose) => Ok(LoanStatus::Closed),

        (status, event) => Err(illegal("loan", status, event.name())),
    }
}

fn illegal(
    instrument: &'static str,
    from: impl std::fmt::Debug,
    requested: &'static str,
) -> LifecycleError {
    LifecycleError::IllegalTransition {
        instrument,
        from: format!("{:?}", from),
        requested: requested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnginePolicy;
    use crate::decimal::{Money, Rate};
    use crate::types::{FdType, LoanType, RdType};
    use chrono::{Duration, TimeZone};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn active_fd(time: &SafeTimeProvider) -> FixedDeposit {
        FixedDeposit::open(
            "CUST-001",
            Money::from_major(100_000),
            Rate::from_percentage(dec!(6.5)),
            12,
            FdType::Regular,
            &EnginePolicy::standard(),
            time,
        )
        .unwrap()
    }

    fn active_rd(time: &SafeTimeProvider) -> RecurringDeposit {
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

    fn pending_loan(time: &SafeTimeProvider) -> Loan {
        Loan::open(
            "CUST-001",
            Money::from_major(500_000),
            Rate::from_percentage(dec!(12)),
            60,
            LoanType::Personal,
            &EnginePolicy::standard(),
            time,
        )
        .unwrap()
    }

    #[test]
    fn test_fd_matures_only_at_maturity_date() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let fd = active_fd(&time);

        let early = fd_transition(&fd, FdEvent::MaturityCheck { now: time.now() }).unwrap();
        assert_eq!(early, FdStatus::Active);

        let at_maturity =
            fd_transition(&fd, FdEvent::MaturityCheck { now: fd.maturity_date }).unwrap();
        assert_eq!(at_maturity, FdStatus::Matured);

        let past = fd_transition(
            &fd,
            FdEvent::MaturityCheck { now: fd.maturity_date + Duration::days(90) },
        )
        .unwrap();
        assert_eq!(past, FdStatus::Matured);
    }

    #[test]
    fn test_fd_maturity_check_is_idempotent() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut fd = active_fd(&time);
        fd.status = FdStatus::Matured;

        let now = fd.maturity_date + Duration::days(1);
        for _ in 0..3 {
            let status = fd_transition(&fd, FdEvent::MaturityCheck { now }).unwrap();
            assert_eq!(status, FdStatus::Matured);
        }

        // checking a closed deposit never resurrects it
        fd.status = FdStatus::Closed;
        let status = fd_transition(&fd, FdEvent::MaturityCheck { now }).unwrap();
        assert_eq!(status, FdStatus::Closed);
    }

    #[test]
    fn test_fd_close_requires_settled_state() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut fd = active_fd(&time);

        // active deposits cannot close directly
        assert!(fd_transition(&fd, FdEvent::Close).is_err());

        fd.status = FdStatus::Matured;
        assert_eq!(fd_transition(&fd, FdEvent::Close).unwrap(), FdStatus::Closed);

        fd.status = FdStatus::PrematureClosed;
        assert_eq!(fd_transition(&fd, FdEvent::Close).unwrap(), FdStatus::Closed);

        fd.status = FdStatus::Closed;
        let err = fd_transition(&fd, FdEvent::Close).unwrap_err();
        assert!(err.to_string().contains("Closed"));
    }

    #[test]
    fn test_fd_premature_close_only_while_active() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut fd = active_fd(&time);

        assert_eq!(
            fd_transition(&fd, FdEvent::PrematureClose).unwrap(),
            FdStatus::PrematureClosed
        );

        for status in [FdStatus::Matured, FdStatus::PrematureClosed, FdStatus::Closed] {
            fd.status = status;
            assert!(fd_transition(&fd, FdEvent::PrematureClose).is_err());
        }
    }

    #[test]
    fn test_fd_renew_requires_matured_state() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut fd = active_fd(&time);

        assert!(fd_transition(&fd, FdEvent::Renew).is_err());

        // a prematurely closed deposit settles, it does not roll over
        fd.status = FdStatus::PrematureClosed;
        assert!(fd_transition(&fd, FdEvent::Renew).is_err());

        fd.status = FdStatus::Matured;
        assert_eq!(fd_transition(&fd, FdEvent::Renew).unwrap(), FdStatus::Closed);

        fd.status = FdStatus::Closed;
        assert!(fd_transition(&fd, FdEvent::Renew).is_err());
    }

    #[test]
    fn test_rd_matures_when_paid_up_and_due() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut rd = active_rd(&time);
        let past_maturity = rd.maturity_date + Duration::days(1);

        // date reached but installments missing: still active
        let status = rd_transition(&rd, RdEvent::MaturityCheck { now: past_maturity }).unwrap();
        assert_eq!(status, RdStatus::Active);

        // all paid but date not reached: still active
        rd.paid_installments = rd.tenure_months;
        let status = rd_transition(&rd, RdEvent::MaturityCheck { now: time.now() }).unwrap();
        assert_eq!(status, RdStatus::Active);

        // both conditions met
        let status = rd_transition(&rd, RdEvent::MaturityCheck { now: past_maturity }).unwrap();
        assert_eq!(status, RdStatus::Matured);
    }

    #[test]
    fn test_rd_final_installment_can_mature() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut rd = active_rd(&time);
        rd.paid_installments = rd.tenure_months - 1;

        // final installment posted after the maturity date passed
        let late = rd.maturity_date + Duration::days(3);
        let status = rd_transition(&rd, RdEvent::InstallmentPosted { now: late }).unwrap();
        assert_eq!(status, RdStatus::Matured);

        // final installment posted on time stays active until the date
        let status = rd_transition(&rd, RdEvent::InstallmentPosted { now: time.now() }).unwrap();
        assert_eq!(status, RdStatus::Active);
    }

    #[test]
    fn test_rd_closes_from_any_live_state() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut rd = active_rd(&time);

        for status in [RdStatus::Active, RdStatus::Matured, RdStatus::Defaulted] {
            rd.status = status;
            assert_eq!(rd_transition(&rd, RdEvent::Close).unwrap(), RdStatus::Closed);
        }

        rd.status = RdStatus::Closed;
        assert!(rd_transition(&rd, RdEvent::Close).is_err());
    }

    #[test]
    fn test_rd_default_only_while_active() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut rd = active_rd(&time);

        assert_eq!(
            rd_transition(&rd, RdEvent::MarkDefaulted).unwrap(),
            RdStatus::Defaulted
        );

        rd.status = RdStatus::Matured;
        assert!(rd_transition(&rd, RdEvent::MarkDefaulted).is_err());
    }

    #[test]
    fn test_loan_disburse_then_repay_to_closure() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut loan = pending_loan(&time);

        assert_eq!(
            loan_transition(&loan, LoanEvent::Disburse).unwrap(),
            LoanStatus::Active
        );

        // emis cannot post while pending
        assert!(loan_transition(&loan, LoanEvent::EmiPosted).is_err());

        loan.status = LoanStatus::Active;
        assert_eq!(
            loan_transition(&loan, LoanEvent::EmiPosted).unwrap(),
            LoanStatus::Active
        );

        loan.paid_emis = loan.tenure_months - 1;
        assert_eq!(
            loan_transition(&loan, LoanEvent::EmiPosted).unwrap(),
            LoanStatus::Closed
        );
    }

    #[test]
    fn test_loan_terminal_states_reject_everything() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut loan = pending_loan(&time);

        for status in [LoanStatus::Closed, LoanStatus::Defaulted] {
            loan.status = status;
            for event in [
                LoanEvent::Disburse,
                LoanEvent::EmiPosted,
                LoanEvent::MarkDefaulted,
                LoanEvent::Foreclose,
            ] {
                assert!(
                    loan_transition(&loan, event).is_err(),
                    "{:?} accepted {:?}",
                    status,
                    event
                );
            }
        }
    }

    #[test]
    fn test_loan_foreclose_and_default_require_active() {
        let time = SafeTimeProvider::new(TimeSource::Test(start()));
        let mut loan = pending_loan(&time);

        assert!(loan_transition(&loan, LoanEvent::Foreclose).is_err());
        assert!(loan_transition(&loan, LoanEvent::MarkDefaulted).is_err());

        loan.status = LoanStatus::Active;
        assert_eq!(
            loan_transition(&loan, LoanEvent::Foreclose).unwrap(),
            LoanStatus::Closed
        );
        assert_eq!(
            loan_transition(&loan, LoanEvent::MarkDefaulted).unwrap(),
            LoanStatus::Defaulted
        );

        // double disbursement is rejected
        assert!(loan_transition(&loan, LoanEvent::Disburse).is_err());
    }
}
