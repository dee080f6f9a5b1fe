//! Deployment and reconciliation for policy functions.
//!
//! This crate owns the content-addressed bundle builder, the
//! create-or-update reconcilers for functions, aliases, and event rules,
//! and the AWS SDK adapters behind narrow seams. Reconciliation is
//! idempotent and safe to re-run: remote mutations are issued only when a
//! diff against observed state demands them.

pub mod adapters;
pub mod archive;
pub mod binding;
pub mod bundle;
pub mod error;
pub mod reconcile;

pub use error::{ArchiveError, DeployError};
