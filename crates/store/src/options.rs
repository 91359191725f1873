//! Reconciliation policies for [`SubtitleStore`](crate::SubtitleStore).

use std::fmt;
use std::str::FromStr;

/// How a subtitle re-fetch reconciles with entries already held locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefetchPolicy {
    /// The fetched list replaces local entries wholesale.
    #[default]
    ReplaceAll,
    /// A fetched entry yields to the local copy with the same id when the
    /// local `updated_at` is strictly newer.
    KeepNewerLocal,
}

/// What happens locally to the neighbor absorbed by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Replace the merged entry only; the neighbor lingers until the next
    /// full reload.
    #[default]
    LeaveNeighbor,
    /// Re-fetch the project's entries after every successful merge.
    ReloadEntries,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub refetch_policy: RefetchPolicy,
    pub merge_policy: MergePolicy,
}

/// An unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} policy {value:?}")]
pub struct PolicyParseError {
    pub kind: &'static str,
    pub value: String,
}

impl RefetchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReplaceAll => "replace_all",
            Self::KeepNewerLocal => "keep_newer_local",
        }
    }
}

impl MergePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeaveNeighbor => "leave_neighbor",
            Self::ReloadEntries => "reload_entries",
        }
    }
}

impl FromStr for RefetchPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace_all" => Ok(Self::ReplaceAll),
            "keep_newer_local" => Ok(Self::KeepNewerLocal),
            _ => Err(PolicyParseError {
                kind: "refetch",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leave_neighbor" => Ok(Self::LeaveNeighbor),
            "reload_entries" => Ok(Self::ReloadEntries),
            _ => Err(PolicyParseError {
                kind: "merge",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RefetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
