use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod fetcher;
pub mod query;
pub mod transport;

pub use fetcher::ChangeFetcher;
pub use transport::{ReviewTransport, SshTransport};

/// Approval type Gerrit records when a change is submitted.
pub const SUBMIT_APPROVAL: &str = "SUBM";

/// One change as emitted by `gerrit query --format=json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub created_on: i64,
    pub last_updated: i64,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub current_patch_set: Option<PatchSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    #[serde(default)]
    pub size_insertions: i64,
    #[serde(default)]
    pub size_deletions: i64,
    #[serde(default)]
    pub approvals: Option<Vec<Approval>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(rename = "type")]
    pub kind: String,
    pub granted_on: i64,
}

/// Trailing status line of a query page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub more_changes: bool,
}

impl Change {
    pub fn author(&self) -> Option<&str> {
        self.owner.as_ref()?.username.as_deref()
    }

    /// Submission time, falling back to `lastUpdated` when the change carries
    /// no approvals or no submit record.
    pub fn merged_on(&self) -> i64 {
        self.current_patch_set
            .as_ref()
            .and_then(|ps| ps.approvals.as_ref())
            .and_then(|approvals| {
                approvals
                    .iter()
                    .find(|approval| approval.kind == SUBMIT_APPROVAL)
                    .map(|approval| approval.granted_on)
            })
            .unwrap_or(self.last_updated)
    }

    /// Lines touched by the current patch set, never negative.
    pub fn size(&self) -> u64 {
        self.current_patch_set
            .as_ref()
            .map(|ps| (ps.size_insertions + ps.size_deletions).max(0) as u64)
            .unwrap_or(0)
    }

    pub fn created_date(&self) -> NaiveDate {
        epoch_date(self.created_on)
    }

    pub fn merged_date(&self) -> NaiveDate {
        epoch_date(self.merged_on())
    }
}

/// Calendar day (UTC) of an epoch timestamp. Out-of-range values collapse to
/// the epoch.
pub fn epoch_date(timestamp: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .date_naive()
}
