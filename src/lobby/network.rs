//! Transport seam between a bot and its game client relay.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{FirstPick, GameMode, ServerRegion};

/// Errors surfaced by a lobby relay.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("relay rejected the request with code {code}")]
    Rejected { code: u32 },
    #[error("relay connection lost: {0}")]
    Disconnected(String),
    #[error("relay io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("relay protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Slot a member occupies inside a hosted lobby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyTeam {
    Radiant,
    Dire,
    Unassigned,
    Spectator,
    Broadcaster,
}

impl LobbyTeam {
    /// A member counts toward the start gate only from a playing slot.
    pub fn is_seated(self) -> bool {
        matches!(self, LobbyTeam::Radiant | LobbyTeam::Dire)
    }
}

/// One member of a hosted lobby.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyMember {
    pub steam_id: String,
    pub team: LobbyTeam,
}

/// Snapshot of lobby state pushed by the relay whenever anything changes.
///
/// `match_id` is zero until the game server assigns one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyUpdate {
    pub lobby_id: u64,
    #[serde(default)]
    pub match_id: u64,
    pub members: Vec<LobbyMember>,
}

impl LobbyUpdate {
    pub fn seated(&self) -> usize {
        self.members.iter().filter(|m| m.team.is_seated()).count()
    }
}

/// Settings for creating a hosted lobby.
#[derive(Clone, Debug, Serialize)]
pub struct LobbyOptions {
    pub game_name: String,
    pub pass_key: String,
    pub server: ServerRegion,
    pub game_mode: GameMode,
    pub first_pick: FirstPick,
    pub allow_spectating: bool,
}

/// Commands a bot can issue to its game client.
///
/// Implementations must resolve each call only once the relay acknowledges
/// it, so callers can sequence lobby operations reliably.
#[async_trait]
pub trait LobbyNetwork: Send + Sync {
    async fn create_lobby(&self, options: &LobbyOptions) -> Result<(), NetworkError>;

    async fn leave_lobby(&self) -> Result<(), NetworkError>;

    /// Vacates the bot's own player slot so it does not count as seated.
    async fn kick_own_slot(&self) -> Result<(), NetworkError>;

    async fn balanced_shuffle(&self) -> Result<(), NetworkError>;

    async fn launch_lobby(&self) -> Result<(), NetworkError>;

    async fn invite(&self, steam_id: &str) -> Result<(), NetworkError>;

    async fn join_chat(&self, channel: &str) -> Result<(), NetworkError>;

    async fn send_chat(&self, channel: &str, message: &str) -> Result<(), NetworkError>;
}
