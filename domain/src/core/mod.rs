//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ErrorKind`]: the closed error taxonomy
//! - [`error::DomainError`]: domain-level errors
//! - [`validation::ConfigIssue`]: structured configuration findings

pub mod error;
pub mod validation;
