//! Bounded retry policy for whole-transfer restarts.
//!
//! Every attempt restarts from byte 0; the policy only decides whether
//! another attempt is allowed and how long to wait before it.

mod policy;

pub use policy::{RetryDecision, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
