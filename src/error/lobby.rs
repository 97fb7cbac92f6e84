use thiserror::Error;

use crate::lobby::network::NetworkError;

/// Outcome of a failed lobby creation attempt.
///
/// `NoAvailableBot` is recoverable and retried on the next reconciliation
/// tick; `Rejected` means the game network refused the lobby and is left for
/// manual intervention (or the normal-cadence retry), never retried faster.
#[derive(Error, Debug)]
pub enum CreateLobbyError {
    /// Every bot in the pool currently owns a lobby session.
    #[error("all lobby hosts are busy")]
    NoAvailableBot,

    /// The game network refused to create the lobby.
    #[error("the game network rejected the lobby: {0}")]
    Rejected(#[from] NetworkError),
}

/// Outcome of a failed lobby close or start request.
#[derive(Error, Debug)]
pub enum CloseLobbyError {
    /// No bot currently owns a lobby session for the event.
    #[error("no bot is hosting a lobby for event #{0}")]
    NotInLobby(i32),
}
