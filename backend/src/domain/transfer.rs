//! Transfer request records and the outbound worker payload.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persisted transfer request.
///
/// Created with status `pending` before the rewrite worker is invoked; the
/// worker updates the status out-of-band. `coin_cost` always matches the
/// exact amount debited for the request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Record identifier, shared with the worker for later updates.
    pub id: Uuid,
    /// Email of the requesting account.
    pub user_id: String,
    /// Source repository URL.
    pub source_repo: String,
    /// Destination URL with the requester's token embedded as userinfo.
    /// Write-only: never serialised into read endpoint responses.
    pub dest_repo: String,
    /// Clean destination URL kept for display and audit.
    pub original_dest_repo: String,
    /// Optional start of the date range to rewrite.
    pub start_date: Option<String>,
    /// Optional end of the date range to rewrite.
    pub end_date: Option<String>,
    /// Whether original commit dates are preserved.
    pub keep_original_dates: bool,
    /// Contributor names to map, as submitted.
    pub contributors: Vec<String>,
    /// Exact amount debited for this request.
    pub coin_cost: i64,
    /// Human-readable premium feature labels.
    pub features: Vec<String>,
    /// Worker-owned lifecycle state; `pending` at creation.
    pub status: TransferStatus,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a transfer request.
///
/// Only `Pending` is ever written by this subsystem; the remaining states
/// belong to the rewrite worker's out-of-band updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStatus {
    /// Submitted, awaiting the worker.
    #[default]
    Pending,
    /// Worker finished successfully.
    Completed,
    /// Worker reported failure.
    Failed,
}

impl TransferStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the storage representation, defaulting unknown values to
    /// `Pending` is deliberately NOT done; unknown states are worker bugs.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Payload submitted to the external rewrite worker.
///
/// Field names follow the worker's wire contract.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferJob {
    /// Persisted record id, passed so the worker can update it later.
    pub transfer_id: Uuid,
    /// Source repository URL.
    pub source_repo: String,
    /// Credential-embedded destination URL.
    pub dest_repo: String,
    /// Clean destination URL.
    pub original_dest_repo: String,
    /// Optional rewrite range start.
    pub start_date: Option<String>,
    /// Optional rewrite range end.
    pub end_date: Option<String>,
    /// Whether original commit dates are preserved.
    pub keep_original_dates: bool,
    /// Contributor names to map.
    pub contributors: Vec<String>,
    /// Requesting account's email.
    pub user_id: String,
    /// Provider username parsed from the destination path, when known.
    pub user_name: String,
}
