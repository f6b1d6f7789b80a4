//! Transaction reference codes
//!
//! Every orchestrated operation carries a unique, human-readable reference:
//! `PREFIX-BRANCHCODE-YYYYMMDD-SEQ`. Sequences are scoped per
//! (branch, effective prefix, date); inter-branch operations extend the
//! prefix with an `I` marker so they number independently. Issuance goes
//! through the storage sequencer: reserve, then commit on success or revert
//! on failure. Reverted slots stay voided forever.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::operations::OperationType;

/// A reference code failed to parse
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Malformed reference code: {0}")]
pub struct ReferenceParseError(pub String);

/// Scope key of a reference sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceKey {
    /// Branch code as published by the branch directory
    pub branch_code: String,
    /// Effective prefix, including the inter-branch marker when set
    pub prefix: String,
    /// Accounting date the sequence runs under
    pub date: NaiveDate,
}

impl ReferenceKey {
    /// Builds the scope key for an operation
    pub fn new(
        branch_code: impl Into<String>,
        operation: OperationType,
        date: NaiveDate,
        inter_branch: bool,
    ) -> Self {
        let mut prefix = operation.reference_prefix().to_string();
        if inter_branch {
            prefix.push('I');
        }
        Self {
            branch_code: branch_code.into(),
            prefix,
            date,
        }
    }

    /// Formats the reference code for a sequence slot
    pub fn format(&self, sequence: u64) -> TransactionReference {
        TransactionReference(format!(
            "{}-{}-{}-{:05}",
            self.prefix,
            self.branch_code,
            self.date.format("%Y%m%d"),
            sequence
        ))
    }
}

/// A formatted reference code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

impl TransactionReference {
    /// Wraps an already formatted code
    pub fn from_code(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the code back into its parts
    pub fn parse(&self) -> Result<ParsedReference, ReferenceParseError> {
        let mut parts = self.0.split('-');
        let (prefix, branch_code, date, sequence) = match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some(p), Some(b), Some(d), Some(s), None) => (p, b, d, s),
            _ => return Err(ReferenceParseError(self.0.clone())),
        };

        let date = NaiveDate::parse_from_str(date, "%Y%m%d")
            .map_err(|_| ReferenceParseError(self.0.clone()))?;
        let sequence: u64 = sequence
            .parse()
            .map_err(|_| ReferenceParseError(self.0.clone()))?;

        Ok(ParsedReference {
            prefix: prefix.to_string(),
            branch_code: branch_code.to_string(),
            date,
            sequence,
        })
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parts of a reference code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub prefix: String,
    pub branch_code: String,
    pub date: NaiveDate,
    pub sequence: u64,
}

/// Lifecycle of a reserved reference slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Claimed by an in-flight operation
    Reserved,
    /// Permanently used by a committed operation
    Committed,
    /// Voided by a failed operation; never reissued
    Reverted,
}

impl ReservationStatus {
    /// Returns true once the slot can no longer change state
    pub fn is_final(&self) -> bool {
        matches!(self, ReservationStatus::Committed | ReservationStatus::Reverted)
    }
}
