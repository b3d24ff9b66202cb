//! Server-side domain services used by HTTP routes and the CLI.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod account;
pub mod media;
pub mod role;
pub mod session;
pub mod stats;
