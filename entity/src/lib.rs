pub mod prelude;

pub mod confirm;
pub mod event;
pub mod player;
