//! Domain building blocks shared by the store and the web server.
//!
//! Nothing in here touches the network or the database: ids and timestamps,
//! the domain error type, the per-action authorization policy, form
//! definitions with their validators and presentation hints, and small pure
//! helpers (slugs, search patterns, image inspection).

pub mod error;
pub mod forms;
pub mod media;
pub mod password_rules;
pub mod policy;
pub mod search;
pub mod slug;
pub mod types;
