//! Contact-form spam protection: a per-identity sliding-window submission
//! limiter with an hourly cap, a daily cap, and a 24-hour block window.
//!
//! The policy lives in [`guard::SpamGuard`] and is backed by any
//! [`store::RecordStore`]; the service wires it up with either the in-memory
//! map or the sled tree depending on deployment.

pub mod guard;
pub mod identity;
pub mod record;
pub mod store;

pub use guard::{Decision, SpamGuard, SubmissionStatus};
pub use record::SubmissionRecord;
pub use store::{MemoryStore, RecordStore, SledStore, StoreError};
