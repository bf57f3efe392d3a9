//! In-memory escrow record store.
//!
//! Records live for the life of the process. The map is a `DashMap`, and id
//! allocation goes through its entry API, so two concurrent `create` calls
//! can never claim the same id.

mod id;
mod record;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{StoreError, StoreResult};

pub use id::{EscrowId, ESCROW_ID_LEN};
pub use record::{EscrowRecord, EscrowStatus};

/// Shared escrow store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct EscrowStore {
    records: Arc<DashMap<EscrowId, EscrowRecord>>,
}

impl EscrowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `pending` escrow owned by `owner_id`.
    ///
    /// The owner id is stored as given. Blank ids and ids with surrounding
    /// whitespace are rejected.
    pub fn create(&self, owner_id: &str, amount: f64) -> StoreResult<EscrowId> {
        if owner_id.is_empty() || owner_id.trim() != owner_id {
            return Err(StoreError::InvalidOwner);
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(StoreError::InvalidAmount { amount });
        }

        loop {
            let id = EscrowId::generate(owner_id, amount);
            match self.records.entry(id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(escrow_id = %id, "escrow id collision, regenerating");
                }
                Entry::Vacant(slot) => {
                    slot.insert(EscrowRecord::pending(id.clone(), owner_id, amount));
                    tracing::info!(escrow_id = %id, owner_id, amount, "escrow created");
                    return Ok(id);
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<EscrowRecord> {
        self.records.get(id).map(|r| r.value().clone())
    }

    /// Like [`get`](Self::get), with a miss as `NotFound`.
    pub fn fetch(&self, id: &str) -> StoreResult<EscrowRecord> {
        self.get(id).ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Move an escrow to `next`, forward only.
    pub fn transition(&self, id: &str, next: EscrowStatus) -> StoreResult<EscrowRecord> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let from = record.status;
        if !from.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from,
                to: next,
            });
        }
        record.status = next;
        tracing::info!(escrow_id = id, %from, to = %next, "escrow status changed");
        Ok(record.value().clone())
    }

    /// All escrows of one owner, oldest first.
    pub fn list_by_owner(&self, owner_id: &str) -> Vec<EscrowRecord> {
        let mut out: Vec<EscrowRecord> = self
            .records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.escrow_id.cmp(&b.escrow_id))
        });
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_get() {
        let store = EscrowStore::new();
        let id = store.create("42", 100.0).unwrap();

        assert_eq!(id.as_str().len(), ESCROW_ID_LEN);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));

        let record = store.get(id.as_str()).unwrap();
        assert_eq!(record.escrow_id, id);
        assert_eq!(record.owner_id, "42");
        assert_eq!(record.amount, 100.0);
        assert_eq!(record.status, EscrowStatus::Pending);
        assert!(record.parties.is_empty());
    }

    #[test]
    fn test_invalid_amount_leaves_store_unchanged() {
        let store = EscrowStore::new();
        for amount in [-5.0, 0.0, -0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store.create("1", amount).unwrap_err();
            assert!(matches!(err, StoreError::InvalidAmount { .. }), "{amount}");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_owner() {
        let store = EscrowStore::new();
        assert_eq!(store.create("", 1.0), Err(StoreError::InvalidOwner));
        assert_eq!(store.create("   ", 1.0), Err(StoreError::InvalidOwner));
        assert!(store.is_empty());
    }

    #[test]
    fn test_padded_owner_rejected() {
        let store = EscrowStore::new();
        for owner in [" 42 ", "42 ", "\t42", "42\n"] {
            assert_eq!(store.create(owner, 1.0), Err(StoreError::InvalidOwner), "{owner:?}");
        }
        assert!(store.is_empty());

        let id = store.create("42", 1.0).unwrap();
        assert_eq!(store.get(id.as_str()).unwrap().owner_id, "42");
        assert_eq!(store.list_by_owner("42").len(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = EscrowStore::new();
        assert!(store.get("doesnotexist").is_none());
        assert_eq!(
            store.fetch("doesnotexist"),
            Err(StoreError::NotFound {
                id: "doesnotexist".into()
            })
        );
    }

    #[test]
    fn test_same_inputs_give_distinct_ids() {
        let store = EscrowStore::new();
        let a = store.create("7", 5.0).unwrap();
        let b = store.create("7", 5.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clones_share_records() {
        let store = EscrowStore::new();
        let handle = store.clone();
        let id = handle.create("9", 1.5).unwrap();
        assert!(store.get(id.as_str()).is_some());
    }

    #[test]
    fn test_forward_transitions() {
        let store = EscrowStore::new();
        let id = store.create("1", 10.0).unwrap();

        let rec = store.transition(id.as_str(), EscrowStatus::Accepted).unwrap();
        assert_eq!(rec.status, EscrowStatus::Accepted);

        let err = store
            .transition(id.as_str(), EscrowStatus::Pending)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                id: id.to_string(),
                from: EscrowStatus::Accepted,
                to: EscrowStatus::Pending,
            }
        );

        store.transition(id.as_str(), EscrowStatus::Completed).unwrap();
        for next in [
            EscrowStatus::Pending,
            EscrowStatus::Accepted,
            EscrowStatus::Completed,
            EscrowStatus::Cancelled,
        ] {
            assert!(store.transition(id.as_str(), next).is_err());
        }
        assert_eq!(store.get(id.as_str()).unwrap().status, EscrowStatus::Completed);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let store = EscrowStore::new();
        let id = store.create("1", 10.0).unwrap();
        store.transition(id.as_str(), EscrowStatus::Cancelled).unwrap();
        assert!(store.transition(id.as_str(), EscrowStatus::Accepted).is_err());
        assert!(store.transition(id.as_str(), EscrowStatus::Cancelled).is_err());
    }

    #[test]
    fn test_self_transition_rejected() {
        let store = EscrowStore::new();
        let id = store.create("1", 10.0).unwrap();
        assert!(store.transition(id.as_str(), EscrowStatus::Pending).is_err());
    }

    #[test]
    fn test_transition_unknown_id() {
        let store = EscrowStore::new();
        assert!(matches!(
            store.transition("nope", EscrowStatus::Accepted),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_by_owner() {
        let store = EscrowStore::new();
        let a = store.create("alice", 1.0).unwrap();
        store.create("bob", 2.0).unwrap();
        let c = store.create("alice", 3.0).unwrap();

        let ids: Vec<EscrowId> = store
            .list_by_owner("alice")
            .into_iter()
            .map(|r| r.escrow_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&c));
        assert!(store.list_by_owner("carol").is_empty());
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!("Accepted".parse::<EscrowStatus>(), Ok(EscrowStatus::Accepted));
        assert_eq!("canceled".parse::<EscrowStatus>(), Ok(EscrowStatus::Cancelled));
        assert!("disputed".parse::<EscrowStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&EscrowStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn test_record_json_shape() {
        let store = EscrowStore::new();
        let id = store.create("42", 100.0).unwrap();
        let json = serde_json::to_value(store.get(id.as_str()).unwrap()).unwrap();
        assert_eq!(json["escrow_id"], id.as_str());
        assert_eq!(json["owner_id"], "42");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["parties"], serde_json::json!([]));
    }
}
