//! Entity factories for tests.
//!
//! Each factory creates one entity with sensible defaults that can be
//! overridden through a builder pattern, reducing boilerplate in tests.

pub mod confirm;
pub mod event;
pub mod helpers;
pub mod player;
