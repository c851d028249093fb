//! Core module - the note-graph consistency engine
//!
//! Nothing in here prints. Per-note problems are logged through `tracing` and
//! surfaced in the returned reports; only an inaccessible notes root is fatal.

pub mod apply;
pub mod backlinks;
pub mod config;
pub mod file;
pub mod identity;
pub mod index;
pub mod links;
pub mod metadata;
pub mod query;
pub mod repair;
pub mod template;
pub mod xref;

pub use apply::{AlwaysConfirm, Change, Confirm, Mode, Outcome};
pub use backlinks::{update_backlinks, BacklinkReport, Policy};
pub use config::{Config, ConfigError, LinkStyle, SelectorKind};
pub use file::NoteError;
pub use identity::{IdParseError, NoteId};
pub use index::{ConflictReport, IdConflict, IndexError, Note, NoteIndex};
pub use links::{check_links, Finding, LinkReport, LinkStatus};
pub use metadata::{Metadata, MetadataError};
pub use repair::{repair_links, RepairReport};
pub use template::TemplateError;
