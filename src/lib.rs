//! # Wicket
//!
//! A group-scoped wiki storage core. Entries live in two places that
//! must stay consistent: a SQLite table (fast lookup, access-control
//! metadata) and a git working tree (durable history, diff-able
//! content). SQLite is authoritative; the working tree is a best-effort
//! mirror that degrades instead of blocking writes.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!      writes ───▶│ WikiService  │◀─── reads
//!                 └──────┬───────┘
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!    ┌──────────┐  ┌───────────┐  ┌────────────┐
//!    │  access  │  │   repo    │  │    sync    │
//!    │  filter  │  │ (SQLite)  │  │ (git tree) │
//!    └──────────┘  └───────────┘  └────────────┘
//! ```
//!
//! Writes flow one way (service → repository → content mirror, mirror
//! best-effort); reads never touch the mirror except for per-file
//! history.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`slug`] | Title normalization |
//! | [`access`] | Group-based visibility rules |
//! | [`repo`] | Entry repository (live + archived rows) |
//! | [`sync`] | Git-mirrored content store |
//! | [`service`] | Orchestration: list/view/search/create/edit/archive |
//! | [`db`] | Database connection and schema |
//! | [`error`] | Error taxonomy |

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod service;
pub mod slug;
pub mod sync;
