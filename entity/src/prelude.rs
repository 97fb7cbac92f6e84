pub use super::confirm::Entity as Confirm;
pub use super::event::Entity as Event;
pub use super::player::Entity as Player;
