//! Rotating-savings rules for chama groups.
//!
//! A chama runs in rounds. In every round each member contributes once; each contribution is split
//! into a savings portion (kept by the group) and a payout portion. When the last outstanding member
//! contributes, the round closes and the pooled payout portions go to that round's grantee. Grantees
//! rotate through the members in join order.
//!
//! This module holds the pure rules only. Persistence and locking live in
//! [`crate::db::handlers::Ledger`], which calls into these functions inside a transaction.

pub mod rules;

use crate::db::errors::DbError;
use crate::types::{MemberId, Round};
use rust_decimal::Decimal;
use thiserror::Error;

pub use rules::{ContributionSplit, RoundProgress, grantee_for_round, round_progress, split_contribution, validate_contribution};

/// Basis points in one whole (100%).
pub const BASIS_POINTS: i32 = 10_000;

/// Decimal places kept for split amounts.
pub const AMOUNT_SCALE: u32 = 18;

/// Violations of the ledger rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Group is archived")]
    GroupArchived,

    #[error("Group is already archived")]
    AlreadyArchived,

    #[error("Member {member_id} does not belong to this group")]
    NotAMember { member_id: MemberId },

    #[error("Member {member_id} already contributed in round {round}")]
    AlreadyContributed { member_id: MemberId, round: Round },

    #[error("Contribution amount must be positive")]
    NonPositiveAmount,

    #[error("Contribution amount must be exactly {expected}, got {got}")]
    AmountMismatch { expected: Decimal, got: Decimal },

    #[error("Contribution amount is out of range")]
    AmountOutOfRange,

    #[error("Savings ratio must be between 0 and 10000 basis points, got {0}")]
    InvalidSavingsRatio(i32),

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("Only the group creator can archive the group")]
    NotCreator,
}

/// Failure of a persisted ledger operation: either a rule was violated or the database failed.
#[derive(Error, Debug)]
pub enum ChamaError {
    #[error(transparent)]
    Rule(#[from] LedgerError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for ChamaError {
    fn from(err: sqlx::Error) -> Self {
        ChamaError::Database(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ChamaError>;
