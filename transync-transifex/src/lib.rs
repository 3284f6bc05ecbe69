//! # transync-transifex
//!
//! [`TransifexClient`] implements [`transync_core::TranslationService`] over
//! the Transifex v2 REST API using blocking `ureq` requests.

mod client;
mod payload;

pub use client::{TransifexClient, DEFAULT_BASE_URL};
