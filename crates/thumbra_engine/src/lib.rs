//! Resolution engine for the Thumbra media server.
//!
//! Given a locator for an original or a thumbnail, the [`Engine`] probes the
//! object store, negotiates freshness against the client's validators, and on
//! a thumbnail miss drives fetch, decode, resize, encode and upload before
//! serving the result. Absent objects resolve to a [`Placeholder`].
//!
//! # Concurrency
//!
//! At most one generation runs per thumbnail key. Concurrent requests for the
//! same missing thumbnail share one [`GenerationLeases`] entry: the first
//! becomes the owner, the rest wait for its [`GenerationOutcome`] and then
//! read the stored result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod freshness;
mod generate;
mod lease;
mod placeholder;
mod resolver;

pub use freshness::{Conditions, Freshness, format_http_date, negotiate, parse_http_date};
pub use lease::{GenerationLeases, GenerationOutcome, Lease, LeaseGuard, LeaseWaiter};
pub use placeholder::Placeholder;
pub use resolver::{Engine, Resolution};
