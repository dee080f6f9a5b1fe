//! Narrow seams over the provider API, plus the AWS SDK implementations.

pub mod aws;
pub mod functions;
pub mod rules;
pub mod upload;
