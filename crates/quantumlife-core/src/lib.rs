//! # QuantumLife Core — Foundation
//!
//! Domain types, the injected [`clock::Clock`], canonical-string hashing
//! helpers, and the store/adapter trait contracts shared by every stage of
//! the Attention Pipeline.
//!
//! This crate has zero dependencies on sibling `quantumlife-*` crates: it is
//! the single source of truth for the entities in the data model, not an
//! implementation of any pipeline stage.
//!
//! ## What lives here
//! - [`clock`] — the `Clock` trait every component receives instead of
//!   reading wall-clock time directly.
//! - [`hashing`] — SHA-256 hex helpers and the canonical pipe-delimited
//!   string builder used by every stage's content hash.
//! - [`ids`] — stable identifiers (`EventId`, `CircleId`, `CandidateHash`, ...).
//! - [`events`] — the Canonical Event and its kinds.
//! - [`circle`] — Circle and Routing Config.
//! - [`buckets`] — magnitude/horizon/app-class quantization enums.
//! - [`content_safety`] — the forbidden-pattern validator for user-visible
//!   strings.
//! - [`adapters`] — external collaborator trait contracts consumed by the
//!   Router and the Snapshotter's sources (no implementations — transport
//!   adapters are out of scope here). Contracts specific to a single
//!   downstream engine (push transport, calendar executor) live in that
//!   engine's own crate instead, to avoid this crate depending on their
//!   types.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod buckets;
pub mod circle;
pub mod clock;
pub mod content_safety;
pub mod events;
pub mod hashing;
pub mod ids;

pub use buckets::{AppClassBucket, HorizonBucket, MagnitudeBucket};
pub use circle::{Circle, CircleId, RoutingConfig};
pub use clock::{Clock, FixedClock, SystemClock};
pub use content_safety::{validate_user_visible, ContentPolicyError};
pub use events::{CanonicalEvent, EventKind};
pub use hashing::{canonical_string, full_hash, prefix8, sha256_hex, short_hash};
pub use ids::{CandidateHash, EventId};
