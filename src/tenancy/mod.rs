//! Tenant scoping for the edge.
//!
//! - `resolver`: derives the active tenant from the request's domain and
//!   carries it through the request as an explicit context value
//! - `origins`: per-process CORS allow-list, fed from tenant configuration
//! - `headers`: tenant identity annotation on outgoing responses

pub mod headers;
pub mod origins;
pub mod resolver;

pub use resolver::TenantContext;
