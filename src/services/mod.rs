//! Services behind the HTTP layer.
//!
//! ARCHITECTURE
//! ============
//! `ingress` accepts click signals from handlers, `scheduler` is the only
//! code that mutates the canvas, and `persistence` moves snapshots between
//! memory and disk. Route handlers never touch the walker directly.

pub mod ingress;
pub mod persistence;
pub mod scheduler;
