//! Optional configuration file
//!
//! ```toml
//! maildir = "~/Mail"
//! default_account = "work"
//!
//! [accounts.work]
//! email = "me@example.com"
//!
//! [accounts.personal]
//! email = "me@example.org"
//! maildir = "~/Mail-personal"
//! ```

use crate::error::{Result, StatsError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the maildir store
    pub maildir: Option<String>,
    /// Account used when none is given on the command line
    pub default_account: Option<String>,
    /// Named accounts
    pub accounts: BTreeMap<String, AccountConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Owner address, lets the account be selected by address
    pub email: String,
    /// Separate store for this account, overrides the top-level `maildir`
    pub maildir: Option<String>,
}

/// Where to read mail from and which account to select inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub maildir: PathBuf,
    pub account: Option<String>,
}

impl Config {
    /// `<config dir>/mail-stats/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mail-stats").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields the empty
    /// configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| StatsError::Config {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StatsError::Config {
            path: origin.to_string(),
            details: e.to_string(),
        })
    }

    /// Account name -> owner address, for accounts with an address
    #[must_use]
    pub fn addresses(&self) -> BTreeMap<String, String> {
        self.accounts
            .iter()
            .filter(|(_, account)| !account.email.is_empty())
            .map(|(name, account)| (name.clone(), account.email.clone()))
            .collect()
    }

    /// Find a configured account by name or owner address.
    #[must_use]
    pub fn find_account(&self, wanted: &str) -> Option<(&str, &AccountConfig)> {
        self.accounts
            .iter()
            .find(|(name, account)| {
                name.eq_ignore_ascii_case(wanted) || account.email.eq_ignore_ascii_case(wanted)
            })
            .map(|(name, account)| (name.as_str(), account))
    }

    /// Combine command-line choices with the file.
    ///
    /// Precedence for the store: `cli_maildir`, then the selected account's
    /// own `maildir`, then the top-level `maildir`. An account with its own
    /// store is the whole store, so no account is selected inside it.
    pub fn resolve(&self, cli_maildir: Option<&str>, account: Option<&str>) -> Result<Target> {
        let account = account
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .or(self.default_account.as_deref())
            .map(ToString::to_string);

        let own_store = account
            .as_deref()
            .and_then(|wanted| self.find_account(wanted))
            .and_then(|(_, config)| config.maildir.as_deref());

        let (maildir, account) = match (cli_maildir, own_store) {
            (Some(cli), _) => (cli, account),
            (None, Some(own)) => (own, None),
            (None, None) => {
                let top = self.maildir.as_deref().ok_or_else(|| StatsError::Config {
                    path: Self::default_path()
                        .map_or_else(|| "config.toml".to_string(), |p| p.display().to_string()),
                    details: "no maildir configured; pass --maildir or set `maildir`".to_string(),
                })?;
                (top, account)
            }
        };

        Ok(Target {
            maildir: PathBuf::from(shellexpand::tilde(maildir).into_owned()),
            account,
        })
    }
}
