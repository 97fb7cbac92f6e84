//! Data access layer for event scheduling.
//!
//! Each repository wraps a database connection reference and provides
//! methods for one entity. All queries return `Result` with SeaORM's `DbErr`
//! so callers can surface database failures uniformly.

mod confirm;
mod event;
mod player;

pub use confirm::ConfirmRepository;
pub use event::{parse_waiting, EventRepository};
pub use player::PlayerRepository;

#[cfg(test)]
mod test;
