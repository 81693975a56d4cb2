//! Maildir-backed mail source
//!
//! Supports both common on-disk layouts:
//!
//! - nested folders (`INBOX/`, `INBOX/Projects/`, `[Gmail]/Sent Mail/`), as
//!   written by mbsync and offlineimap
//! - Maildir++ (`cur/` at the root is the inbox, folders are `.Sent`,
//!   `.INBOX.Projects`), as written by Dovecot and Courier
//!
//! A store may hold one account directly, or one account per top-level
//! directory.

use crate::error::{FieldError, Result, StatsError};
use crate::normalizer::{FieldResult, RawMessage, normalize};
use crate::source::{AccountInfo, FolderId, MailSource};
use crate::types::{DateWindow, Direction, MessageRecord};
use chrono::{DateTime, Utc};
use mailparse::{DispositionType, MailAddr, MailAddrList, MailHeaderMap, ParsedMail};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Folder names (case-insensitive) recognised as the sent folder
pub const SENT_FOLDER_NAMES: &[&str] = &[
    "sent",
    "sent items",
    "sent mail",
    "sent messages",
    "已发送",
    "已发送邮件",
];

/// Name used for the account when the store holds a single one
pub const DEFAULT_ACCOUNT: &str = "default";

const MAILDIR_SUBDIRS: &[&str] = &["cur", "new", "tmp"];
const RECEIVED_PROGRESS_EVERY: usize = 50;
const SENT_PROGRESS_EVERY: usize = 20;

/// Open handle on a maildir store.
///
/// Acquire it before retrieval, lend it to a [`MaildirSource`], and close it
/// once retrieval is over.
#[derive(Debug)]
pub struct MaildirSession {
    root: PathBuf,
}

impl MaildirSession {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StatsError::Source(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        fs::read_dir(&root)
            .map_err(|e| StatsError::Source(format!("cannot read {}: {e}", root.display())))?;

        info!("Opened maildir store at {}", root.display());
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Release the store.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for MaildirSession {
    fn drop(&mut self) {
        debug!("Closed maildir store at {}", self.root.display());
    }
}

/// [`MailSource`] reading from a [`MaildirSession`]
#[derive(Debug)]
pub struct MaildirSource<'s> {
    session: &'s MaildirSession,
    /// Account name -> owner address
    addresses: BTreeMap<String, String>,
}

impl<'s> MaildirSource<'s> {
    #[must_use]
    pub const fn new(session: &'s MaildirSession) -> Self {
        Self {
            session,
            addresses: BTreeMap::new(),
        }
    }

    /// Attach owner addresses so accounts can be selected by address.
    #[must_use]
    pub fn with_addresses(mut self, addresses: BTreeMap<String, String>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Top-level directories holding one account each; empty when the root
    /// is itself a single account.
    fn account_dirs(&self) -> Vec<PathBuf> {
        let root = self.session.root();
        if find_inbox(root).is_some() {
            return Vec::new();
        }

        child_dirs(root)
            .into_iter()
            .filter(|dir| !leaf_name(dir).starts_with('.') && find_inbox(dir).is_some())
            .collect()
    }

    fn default_root(&self) -> PathBuf {
        self.account_dirs()
            .into_iter()
            .next()
            .unwrap_or_else(|| self.session.root().to_path_buf())
    }

    /// Directory of the selected account, falling back to the default
    /// account when the selection matches nothing.
    fn account_root(&self, account: Option<&str>) -> PathBuf {
        let Some(wanted) = account.map(str::trim).filter(|a| !a.is_empty()) else {
            return self.default_root();
        };

        let dirs = self.account_dirs();
        if let Some(dir) = dirs.iter().find(|d| leaf_name(d).eq_ignore_ascii_case(wanted)) {
            return dir.clone();
        }

        let by_address = self
            .addresses
            .iter()
            .find(|(_, address)| address.eq_ignore_ascii_case(wanted))
            .map(|(name, _)| name.as_str());
        if let Some(name) = by_address {
            if let Some(dir) = dirs.iter().find(|d| leaf_name(d) == name) {
                return dir.clone();
            }
            if dirs.is_empty() {
                return self.session.root().to_path_buf();
            }
        }

        warn!("Account '{wanted}' not found, using default account");
        self.default_root()
    }

    fn sent_folder(&self, account_root: &Path) -> Option<FolderId> {
        let mut candidates = Vec::new();
        if is_maildir(account_root) {
            candidates.push(folder_id(account_root, account_root));
        }
        candidates.extend(subfolders(account_root, account_root));

        candidates
            .into_iter()
            .find(|folder| is_sent_folder_name(&folder_leaf(&folder.path)))
    }

    fn read_folder(
        folder: &FolderId,
        direction: Direction,
        window: &DateWindow,
        progress_every: usize,
    ) -> Vec<MessageRecord> {
        let files = message_files(&folder.path);
        let total = files.len();
        debug!("Processing {total} files in {folder}");

        let mut records = Vec::new();
        for (idx, file) in files.iter().enumerate() {
            if (idx + 1) % progress_every == 0 {
                debug!("{folder}: {}/{total}", idx + 1);
            }

            match load_message(file, direction, window) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {e}", file.path.display()),
            }
        }

        records
    }
}

impl MailSource for MaildirSource<'_> {
    fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let dirs = self.account_dirs();
        if dirs.is_empty() {
            let address = self
                .addresses
                .get(DEFAULT_ACCOUNT)
                .or_else(|| self.addresses.values().next())
                .cloned();
            return Ok(vec![AccountInfo {
                name: DEFAULT_ACCOUNT.to_string(),
                address,
            }]);
        }

        Ok(dirs
            .iter()
            .map(|dir| {
                let name = leaf_name(dir);
                AccountInfo {
                    address: self.addresses.get(&name).cloned(),
                    name,
                }
            })
            .collect())
    }

    fn received_folders(&self, account: Option<&str>) -> Result<Vec<FolderId>> {
        let root = self.account_root(account);
        let inbox = find_inbox(&root).ok_or_else(|| {
            StatsError::Source(format!("no inbox found under {}", root.display()))
        })?;

        let nested = if inbox == root {
            dot_subfolders(&root, "inbox")
        } else {
            subfolders(&root, &inbox)
        };

        // A sent folder filed under the inbox is read as sent mail only
        let mut folders = vec![folder_id(&root, &inbox)];
        folders.extend(
            nested
                .into_iter()
                .filter(|folder| !is_sent_folder_name(&folder_leaf(&folder.path))),
        );

        info!("Found {} inbox folders under {}", folders.len(), root.display());
        Ok(folders)
    }

    fn fetch_received(&self, folders: &[FolderId], window: &DateWindow) -> Vec<MessageRecord> {
        let mut records = Vec::new();
        for (idx, folder) in folders.iter().enumerate() {
            info!("Reading folder {}/{}: {folder}", idx + 1, folders.len());
            let found = Self::read_folder(folder, Direction::Received, window, RECEIVED_PROGRESS_EVERY);
            info!("  {} messages in range", found.len());
            records.extend(found);
        }

        info!("Collected {} received messages", records.len());
        records
    }

    fn fetch_sent(&self, account: Option<&str>, window: &DateWindow) -> Vec<MessageRecord> {
        let root = self.account_root(account);
        let Some(folder) = self.sent_folder(&root) else {
            warn!("No sent folder under {}, skipping sent mail", root.display());
            return Vec::new();
        };

        info!("Reading sent folder {folder}");
        let records = Self::read_folder(&folder, Direction::Sent, window, SENT_PROGRESS_EVERY);
        info!("Collected {} sent messages", records.len());
        records
    }
}

/// A message file inside a maildir folder
#[derive(Debug, Clone)]
struct MessageFile {
    path: PathBuf,
    /// Delivered but never seen by a client
    in_new: bool,
}

impl MessageFile {
    /// Info flags after `:2,` in the file name (sorted letters, `S` = seen)
    fn flags(&self) -> String {
        let name = leaf_name(&self.path);
        name.rfind(":2,")
            .map(|pos| name[pos + 3..].to_string())
            .unwrap_or_default()
    }

    fn is_seen(&self) -> bool {
        !self.in_new && self.flags().contains('S')
    }
}

/// Parsed message plus the maildir metadata that lives outside it
struct MaildirMessage<'a> {
    parsed: ParsedMail<'a>,
    seen: bool,
    modified: Option<DateTime<Utc>>,
}

impl MaildirMessage<'_> {
    fn header(&self, name: &str, field: &'static str) -> FieldResult<String> {
        self.parsed
            .headers
            .get_first_value(name)
            .ok_or_else(|| FieldError::missing(field))
    }

    fn address_list(&self, name: &str, field: &'static str) -> FieldResult<MailAddrList> {
        let header = self
            .parsed
            .headers
            .get_first_header(name)
            .ok_or_else(|| FieldError::missing(field))?;
        mailparse::addrparse_header(header).map_err(|e| FieldError::new(field, e.to_string()))
    }

    /// Display name and address of the first `From:` mailbox
    fn sender(&self) -> FieldResult<(Option<String>, String)> {
        let list = self.address_list("From", "sender")?;
        list.iter()
            .find_map(|addr| match addr {
                MailAddr::Single(info) => Some((info.display_name.clone(), info.addr.clone())),
                MailAddr::Group(group) => group
                    .addrs
                    .first()
                    .map(|info| (info.display_name.clone(), info.addr.clone())),
            })
            .ok_or_else(|| FieldError::missing("sender"))
    }

    fn recipients(&self, name: &str, field: &'static str) -> FieldResult<String> {
        let list = self.address_list(name, field)?;
        let addresses: Vec<&str> = list
            .iter()
            .flat_map(|addr| match addr {
                MailAddr::Single(info) => vec![info.addr.as_str()],
                MailAddr::Group(group) => group.addrs.iter().map(|i| i.addr.as_str()).collect(),
            })
            .collect();
        Ok(addresses.join("; "))
    }

    /// Delivery time stamped by the last hop (the topmost `Received:`)
    fn delivered_at(&self) -> Option<DateTime<Utc>> {
        let value = self.parsed.headers.get_first_value("Received")?;
        received_date(&value)
    }

    fn date(&self, field: &'static str) -> FieldResult<DateTime<Utc>> {
        self.parsed
            .headers
            .get_first_value("Date")
            .and_then(|value| parse_header_date(&value))
            .or(self.modified)
            .ok_or_else(|| FieldError::missing(field))
    }
}

impl RawMessage for MaildirMessage<'_> {
    fn subject(&self) -> FieldResult<String> {
        self.header("Subject", "subject")
    }

    fn sender_address(&self) -> FieldResult<String> {
        self.sender().map(|(_, address)| address)
    }

    fn sender_name(&self) -> FieldResult<String> {
        self.sender()?
            .0
            .ok_or_else(|| FieldError::missing("sender name"))
    }

    fn received_at(&self) -> FieldResult<DateTime<Utc>> {
        self.delivered_at()
            .map_or_else(|| self.date("received time"), Ok)
    }

    fn sent_at(&self) -> FieldResult<DateTime<Utc>> {
        self.date("sent time")
    }

    fn is_unread(&self) -> FieldResult<bool> {
        Ok(!self.seen)
    }

    fn to(&self) -> FieldResult<String> {
        self.recipients("To", "to")
    }

    fn cc(&self) -> FieldResult<String> {
        self.recipients("Cc", "cc")
    }

    fn body(&self) -> FieldResult<String> {
        Ok(body_text(&self.parsed))
    }
}

fn parse_header_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            mailparse::dateparse(value)
                .ok()
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
        })
}

/// Timestamp after the last `;` of a `Received:` trace header
fn received_date(value: &str) -> Option<DateTime<Utc>> {
    let (_, stamp) = value.rsplit_once(';')?;
    parse_header_date(stamp)
}

fn load_message(
    file: &MessageFile,
    direction: Direction,
    window: &DateWindow,
) -> Result<Option<MessageRecord>> {
    let raw = fs::read(&file.path)?;
    let parsed = mailparse::parse_mail(&raw).map_err(|e| StatsError::Source(e.to_string()))?;
    let modified = fs::metadata(&file.path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    let message = MaildirMessage {
        parsed,
        seen: file.is_seen(),
        modified,
    };

    Ok(normalize(&message, direction, window))
}

fn body_text(parsed: &ParsedMail) -> String {
    let mut text = None;
    let mut html = None;
    collect_body_parts(parsed, &mut text, &mut html);

    text.or_else(|| html.map(|h| strip_html(&h)))
        .unwrap_or_default()
}

fn collect_body_parts(part: &ParsedMail, text: &mut Option<String>, html: &mut Option<String>) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_body_parts(sub, text, html);
        }
        return;
    }

    if matches!(
        part.get_content_disposition().disposition,
        DispositionType::Attachment
    ) {
        return;
    }

    let mimetype = part.ctype.mimetype.to_lowercase();
    if text.is_none() && mimetype.starts_with("text/plain") {
        *text = part.get_body().ok();
    } else if html.is_none() && mimetype.starts_with("text/html") {
        *html = part.get_body().ok();
    }
}

fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut skipping = false;
    let mut tag = String::new();

    for c in html.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag.to_lowercase();
                if name.starts_with("script") || name.starts_with("style") {
                    skipping = true;
                } else if name.starts_with("/script") || name.starts_with("/style") {
                    skipping = false;
                } else if name.starts_with("br") || name.starts_with("/p") || name.starts_with("/div") {
                    result.push('\n');
                }
            }
            (true, _) => tag.push(c),
            (false, _) if !skipping => result.push(c),
            (false, _) => {}
        }
    }

    let decoded = result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_maildir(dir: &Path) -> bool {
    dir.join("cur").is_dir() || dir.join("new").is_dir()
}

fn find_inbox(dir: &Path) -> Option<PathBuf> {
    child_dirs(dir)
        .into_iter()
        .find(|child| leaf_name(child).eq_ignore_ascii_case("inbox") && is_maildir(child))
        .or_else(|| is_maildir(dir).then(|| dir.to_path_buf()))
}

/// Sorted subdirectories of `dir`, maildir internals excluded
fn child_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    // Symlinked directories are not followed
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| !MAILDIR_SUBDIRS.contains(&leaf_name(path).as_str()))
        .collect();
    dirs.sort();
    dirs
}

/// Every maildir folder below `dir`, depth-first, parents before children
fn subfolders(base: &Path, dir: &Path) -> Vec<FolderId> {
    child_dirs(dir)
        .into_iter()
        .flat_map(|child| {
            let nested = subfolders(base, &child);
            let own = is_maildir(&child).then(|| folder_id(base, &child));
            own.into_iter().chain(nested)
        })
        .collect()
}

/// Maildir++ folders below `parent` (`.INBOX.Projects` for `inbox`)
fn dot_subfolders(root: &Path, parent: &str) -> Vec<FolderId> {
    let prefix = format!(".{}.", parent.to_lowercase());
    child_dirs(root)
        .into_iter()
        .filter(|dir| leaf_name(dir).to_lowercase().starts_with(&prefix) && is_maildir(dir))
        .map(|dir| folder_id(root, &dir))
        .collect()
}

/// Files in `cur/` and `new/`, sorted by name within each
fn message_files(folder: &Path) -> Vec<MessageFile> {
    ["cur", "new"]
        .into_iter()
        .flat_map(|sub| {
            let mut paths: Vec<PathBuf> = fs::read_dir(folder.join(sub))
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|entry| entry.path())
                        .filter(|path| path.is_file())
                        .collect()
                })
                .unwrap_or_default();
            paths.sort();
            paths.into_iter().map(move |path| MessageFile {
                path,
                in_new: sub == "new",
            })
        })
        .collect()
}

fn folder_id(base: &Path, path: &Path) -> FolderId {
    let relative = path
        .strip_prefix(base)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    FolderId {
        name: if relative.is_empty() {
            "INBOX".to_string()
        } else {
            relative
        },
        path: path.to_path_buf(),
    }
}

fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Last segment of a folder name: `.INBOX.Sent` -> `Sent`
fn folder_leaf(path: &Path) -> String {
    let name = leaf_name(path);
    let trimmed = name.trim_start_matches('.');
    trimmed.rsplit('.').next().unwrap_or(trimmed).to_string()
}

fn is_sent_folder_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    SENT_FOLDER_NAMES.contains(&lower.as_str())
}
