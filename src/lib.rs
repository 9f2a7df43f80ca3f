//! # codetriage
//!
//! Catalogue every repository an owner exposes on a hosting provider into a
//! spreadsheet-friendly triage file, let a human mark which ones matter and
//! at which branch or tag, then clone exactly those.
//!
//! ## Quick Example
//!
//! ```
//! use codetriage::record::Record;
//! use codetriage::schema::{keys, Schema};
//! use codetriage::tabular::TabularStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("triage.csv");
//!
//! let mut record = Record::new(Schema::triage());
//! record.set(keys::NAME, "codetriage_tags").unwrap();
//! record.set(keys::PULL, "Y").unwrap();
//! record.set(keys::PULL_BRANCH_TAG, "0.0.1").unwrap();
//!
//! let store = TabularStore::new(Schema::triage());
//! store.write(&[record.clone()], &path, false).unwrap();
//!
//! let read_back = store.read(&path).unwrap().records().unwrap();
//! assert_eq!(read_back, vec![record]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Schema (`schema`)**: the fixed column table of the triage file: keys,
//!   labels, value types and defaults.
//! - **Record (`record`)**: one typed row; every write is checked against
//!   the schema.
//! - **Tabular store (`tabular`)**: writes records as CSV and reads them back,
//!   tolerating hand-edited files.
//! - **Intent (`intent`)**: the part of a record `pull` acts on.
//! - **Materializer (`materialize`)**: turns intents into working copies at a
//!   branch, a tag or all branches, cleaning up after every failure.
//! - **Providers (`scm`)**: list repositories and supply authenticated git
//!   access. GitHub is the only provider.
//!
//! ## Execution Flow
//!
//! `triage`: provider listing → [`catalogue`] → records → [`tabular`] file.
//!
//! `pull`: [`tabular`] file → records → [`intent`] → [`materialize`] →
//! one report per repository.

pub mod catalogue;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod error;
pub mod git;
pub mod intent;
pub mod materialize;
pub mod output;
pub mod record;
pub mod schema;
pub mod scm;
pub mod tabular;

#[cfg(test)]
mod tabular_proptest;
