//! Domain models shared across the service, data and lobby layers.

pub mod inhouse;
pub mod lobby_status;

pub use inhouse::{FirstPick, GameMode, InhouseSpec, ServerRegion};
pub use lobby_status::LobbyStatus;
