#![cfg_attr(feature = "strict", deny(warnings))]

//! Computes the next semantic version of a release from the labels on its
//! merged pull requests.
//!
//! Every label maps to a [`Severity`]; the release takes the greatest severity
//! found on any of its pull requests and applies it to the previous version.

pub mod feature;
pub mod libs;

pub use feature::pulls::{aggregate, validate, Batch, Config, LabelFetcher};
pub use libs::{
    error::{BoxError, Error},
    labels::LabelTable,
    severity::Severity,
    version::{bump, SemanticVersion},
};
