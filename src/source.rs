//! The mail source collaborator the statistics engine is fed from

use crate::error::Result;
use crate::types::{DateWindow, MessageRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A mail account known to the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Name the account is selected by
    pub name: String,

    /// Address of the account owner, when known
    pub address: Option<String>,
}

impl fmt::Display for AccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{} ({address})", self.name),
            None => write!(f, "{} (address unavailable)", self.name),
        }
    }
}

/// One folder to read received mail from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId {
    /// Human-readable folder name
    pub name: String,

    /// Location of the folder in the store
    pub path: PathBuf,
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Retrieval side of an analysis run.
///
/// Locating accounts and folders may fail. Fetching never does: a source
/// that hits trouble mid-way logs it and returns what it has, possibly
/// nothing.
pub trait MailSource {
    fn list_accounts(&self) -> Result<Vec<AccountInfo>>;

    /// Inbox of `account` (or the default account) and every folder below it.
    fn received_folders(&self, account: Option<&str>) -> Result<Vec<FolderId>>;

    /// Received messages in `folders` that arrived within `window`.
    fn fetch_received(&self, folders: &[FolderId], window: &DateWindow) -> Vec<MessageRecord>;

    /// Messages sent from `account` (or the default account) within `window`.
    fn fetch_sent(&self, account: Option<&str>, window: &DateWindow) -> Vec<MessageRecord>;
}
