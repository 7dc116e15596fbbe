//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the authorize and API
//! endpoints, supported grant flags, the default scope, and provider quirks (request parameter
//! names, scope delimiter, authorize URL fragment). `strategy` defines [`ProviderStrategy`], an
//! HTTP-client-agnostic hook used by flows to augment outgoing token requests and map provider
//! error payloads into the crate error taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
