//! Raw trial record loading.
//!
//! This crate is the raw-data collaborator of the comparison engine: it
//! looks up trial records by NCT identifier and hands them over untouched.
//! Normalization happens downstream.
//!
//! # Features
//!
//! - **Sources**: [`TrialSource`] with a directory-backed and an in-memory
//!   implementation
//! - **ClinicalTrials.gov**: v2 study documents are mapped onto
//!   [`trial_model::RawTrialRecord`]
//!
//! # Example
//!
//! ```ignore
//! use trial_ingest::{DirectorySource, resolve_all};
//!
//! let source = DirectorySource::new("data/trials")?;
//! let records = resolve_all(&source, &["NCT01234567".to_string()])?;
//! ```

mod ctgov;
mod directory;
mod error;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sources ===
pub use directory::{DirectorySource, read_record};
pub use source::{MemorySource, TrialSource, resolve_all};

// === ClinicalTrials.gov ===
pub use ctgov::{CtGovStudy, format_phases, to_raw_record};
