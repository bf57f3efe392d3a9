use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EscrowId;

/// Escrow lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscrowStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl EscrowStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Forward-only: a later stage, or cancelling a live escrow.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("unknown escrow status '{other}'")),
        }
    }
}

/// A tracked escrow transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowRecord {
    pub escrow_id: EscrowId,

    /// Verified user id of the creator.
    pub owner_id: String,

    /// Finite and strictly positive.
    pub amount: f64,

    pub status: EscrowStatus,

    /// Participant ids, in join order.
    #[serde(default)]
    pub parties: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl EscrowRecord {
    pub(crate) fn pending(escrow_id: EscrowId, owner_id: &str, amount: f64) -> Self {
        Self {
            escrow_id,
            owner_id: owner_id.to_string(),
            amount,
            status: EscrowStatus::Pending,
            parties: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
