//! Tessera Authz - the Check / BatchCheck protocol
//!
//! A state-free protocol layer: validate the addressed object and the
//! permission reference locally, then delegate the actual decision to the
//! external resolver capability. `BatchCheck` fans sub-checks out
//! concurrently and reassembles results into request order through an
//! indexed slot vector, so concurrency never affects outcome or ordering.

#![forbid(unsafe_code)]

mod service;

pub use service::{AuthzService, CheckItem, CheckResult};
