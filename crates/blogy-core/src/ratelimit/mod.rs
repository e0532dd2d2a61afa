//! Per-client token-bucket admission control on top of `governor`.

pub mod registry;

pub use registry::{Quota, RateLimitRegistry};
