//! transync core library — resource specs, resolution, service interface.
//!
//! - [`spec`] — load and classify the repository's resource spec JSON
//! - [`resolver`] — English / translated file enumeration
//! - [`service`] — [`TranslationService`] trait and stats types
//! - [`slug`] — resource and project slugs
//! - [`error`] — [`SpecError`], [`ServiceError`]

pub mod error;
pub mod resolver;
pub mod service;
pub mod slug;
pub mod spec;
pub mod types;

pub use error::{ServiceError, SpecError};
pub use resolver::{Resolver, ResolverConfig};
pub use service::{RemoteResource, ResourceStats, TranslationService};
pub use slug::slugify;
pub use types::{
    FileEntry, FileList, Language, ResourceRule, ResourceSpec, TemplatedRule, WildcardRule,
};
