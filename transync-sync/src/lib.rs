//! # transync-sync
//!
//! Hash-gated push / pull between a repository and a translation service.
//!
//! Build an [`Orchestrator`] from a [`TranslationService`] implementation, a
//! [`transync_core::Resolver`] rooted at the clone path and [`SyncSettings`],
//! then call [`Orchestrator::push`], [`Orchestrator::pull`] or
//! [`Orchestrator::write_snapshot`].
//!
//! [`TranslationService`]: transync_core::TranslationService

pub mod change;
pub mod error;
pub mod formats;
pub mod orchestrator;
pub mod snapshot;

pub use error::SyncError;
pub use formats::FormatTable;
pub use orchestrator::{
    Orchestrator, Phase, PullOutcome, PullRow, PushFilter, PushMode, PushOutcome, SnapshotLocation,
    SyncSettings, SyncStatus, Upload, UploadAction, DEFAULT_PROJECT_PREFIX,
    ENGLISH_SNAPSHOT_SUFFIX,
};
pub use snapshot::{HashSnapshot, SnapshotKey};
