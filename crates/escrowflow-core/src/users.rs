//! Last verified profile per user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::handoff::{Claims, WebAppUser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub user: WebAppUser,
    pub auth_date: i64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    entries: Arc<DashMap<String, DirectoryEntry>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified login. An older `auth_date` never replaces a newer profile.
    pub fn upsert(&self, claims: &Claims) -> DirectoryEntry {
        let incoming = DirectoryEntry {
            user: claims.user.clone(),
            auth_date: claims.auth_date,
            last_seen: Utc::now(),
        };
        let mut entry = self
            .entries
            .entry(claims.user_id.clone())
            .or_insert_with(|| incoming.clone());
        if incoming.auth_date >= entry.auth_date {
            *entry = incoming;
        } else {
            entry.last_seen = incoming.last_seen;
        }
        entry.value().clone()
    }

    pub fn get(&self, user_id: &str) -> Option<DirectoryEntry> {
        self.entries.get(user_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
