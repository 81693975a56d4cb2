// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Mailbox statistics
//!
//! Reads the messages of a date range from a mail store and summarises
//! them.
//!
//! # Features
//!
//! - Read/unread tally
//! - Reply correlation between received and sent mail, by subject and day
//! - Top senders and top recipients
//! - Keyword classification (informational, approval, response)
//! - Maildir store support (nested and Maildir++ layouts)
//!
//! # Example
//!
//! ```rust
//! use mail_stats::{Analysis, MessageRecord, TextReport};
//!
//! let received = vec![MessageRecord {
//!     subject: "Please approve the budget".into(),
//!     sender_address: "boss@example.com".into(),
//!     is_read: true,
//!     ..MessageRecord::default()
//! }];
//!
//! let analysis = Analysis::compute(&received, &[]);
//! assert_eq!(analysis.categories.approval_required, 1);
//! println!("{}", TextReport::new(&analysis));
//! ```

mod classify;
mod config;
mod error;
mod maildir;
mod normalizer;
mod report;
mod source;
mod stats;
mod types;

pub use classify::*;
pub use config::{AccountConfig, Config, Target};
pub use error::{FieldError, Result, StatsError};
pub use maildir::{DEFAULT_ACCOUNT, MaildirSession, MaildirSource, SENT_FOLDER_NAMES};
pub use normalizer::*;
pub use report::{TextReport, UNREAD_WARNING_PERCENTAGE, advice, to_json};
pub use source::{AccountInfo, FolderId, MailSource};
pub use stats::*;
pub use types::*;
