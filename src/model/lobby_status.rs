/// Persisted lobby state for an event.
///
/// `NotCreated → Created → Closed`, with the lateral `NoAvailableBot` state
/// reached from `NotCreated` when pool allocation fails; events in
/// `NoAvailableBot` are retried on every reconciliation tick exactly like
/// `NotCreated`. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LobbyStatus {
    NotCreated,
    Created,
    Closed,
    NoAvailableBot,
}

impl LobbyStatus {
    /// The stable string code stored in the `event.lobby_status` column.
    pub fn as_code(&self) -> &'static str {
        match self {
            LobbyStatus::NotCreated => "not_created",
            LobbyStatus::Created => "created",
            LobbyStatus::Closed => "closed",
            LobbyStatus::NoAvailableBot => "no_available_bot",
        }
    }

    /// Parses a stored status code. Unknown codes return `None`; callers
    /// fall back to `NotCreated`.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "not_created" => Some(LobbyStatus::NotCreated),
            "created" => Some(LobbyStatus::Created),
            "closed" => Some(LobbyStatus::Closed),
            "no_available_bot" => Some(LobbyStatus::NoAvailableBot),
            _ => None,
        }
    }

    /// Whether the reconciliation loop may attempt lobby creation from this
    /// state.
    pub fn allows_creation(&self) -> bool {
        matches!(self, LobbyStatus::NotCreated | LobbyStatus::NoAvailableBot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for status in [
            LobbyStatus::NotCreated,
            LobbyStatus::Created,
            LobbyStatus::Closed,
            LobbyStatus::NoAvailableBot,
        ] {
            assert_eq!(LobbyStatus::parse(status.as_code()), Some(status));
        }
    }

    #[test]
    fn unknown_code_is_none() {
        assert_eq!(LobbyStatus::parse("exploded"), None);
    }

    #[test]
    fn creation_allowed_only_before_lobby_exists() {
        assert!(LobbyStatus::NotCreated.allows_creation());
        assert!(LobbyStatus::NoAvailableBot.allows_creation());
        assert!(!LobbyStatus::Created.allows_creation());
        assert!(!LobbyStatus::Closed.allows_creation());
    }
}
