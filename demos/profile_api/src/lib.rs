//! Demo service for apigen.
//!
//! [`api`] holds the annotated handlers; `build.rs` generates
//! [`api::handlers`] from them on every build.

pub mod api;
