//! Reference sequence counters
//!
//! One counter per (branch, prefix, date) key, incremented atomically so
//! concurrent reservations can never hand out the same sequence number.
//! Reservations move Reserved -> Committed on success or Reserved -> Reverted
//! on failure; a reverted number stays burned and is never reissued, which
//! keeps gaps in the audit trail explainable.

use dashmap::DashMap;

use core_kernel::{ReferenceKey, ReservationStatus, TransactionReference};

use crate::error::StoreError;

/// Issues and tracks transaction reference reservations
#[derive(Debug, Default)]
pub struct ReferenceSequencer {
    counters: DashMap<ReferenceKey, u64>,
    reservations: DashMap<TransactionReference, ReservationStatus>,
}

impl ReferenceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next reference for the key.
    ///
    /// The increment happens under the counter's map shard lock, so two
    /// concurrent callers on the same key always see distinct sequences.
    pub fn reserve(&self, key: &ReferenceKey) -> TransactionReference {
        let sequence = {
            let mut counter = self.counters.entry(key.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        let reference = key.format(sequence);
        self.reservations
            .insert(reference.clone(), ReservationStatus::Reserved);
        reference
    }

    /// Marks a reserved reference as committed
    pub fn commit(&self, reference: &TransactionReference) -> Result<(), StoreError> {
        self.finalize(reference, ReservationStatus::Committed)
    }

    /// Marks a reserved reference as reverted. The slot is not reused.
    pub fn revert(&self, reference: &TransactionReference) -> Result<(), StoreError> {
        self.finalize(reference, ReservationStatus::Reverted)
    }

    fn finalize(
        &self,
        reference: &TransactionReference,
        to: ReservationStatus,
    ) -> Result<(), StoreError> {
        match self.reservations.get_mut(reference) {
            Some(mut status) if *status == ReservationStatus::Reserved => {
                *status = to;
                Ok(())
            }
            Some(status) => Err(StoreError::ReferenceState {
                reference: reference.to_string(),
                state: format!("{:?}", *status).to_lowercase(),
            }),
            None => Err(StoreError::ReferenceState {
                reference: reference.to_string(),
                state: "unknown".to_string(),
            }),
        }
    }

    /// Current status of a reference, if it was issued here
    pub fn status(&self, reference: &TransactionReference) -> Option<ReservationStatus> {
        self.reservations.get(reference).map(|s| *s)
    }

    /// Highest sequence issued for a key so far
    pub fn issued(&self, key: &ReferenceKey) -> u64 {
        self.counters.get(key).map(|c| *c).unwrap_or(0)
    }
}
