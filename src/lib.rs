//! Sail-plan logging with multi-user reconciliation.
//!
//! Crew record sail configuration changes as timestamped entries in a
//! shared time-series store. The interesting part is [`reconcile`]: the
//! per-client state machine that keeps in-progress edits consistent with a
//! store other crew members are writing to concurrently, without sessions
//! or locks. Everything else — the [`store`], the [`config`], the boat
//! [`tz`] clock, the [`cli`] — is the plumbing around it.

pub mod cli;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod tz;
