//! Lobby hosting: the bot pool, per-lobby sessions and the relay transport.

pub mod network;
pub mod pool;
pub mod relay;
pub mod session;
#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, warn};

use crate::data::{ConfirmRepository, PlayerRepository};
use crate::error::lobby::{CloseLobbyError, CreateLobbyError};
use crate::error::AppError;
use crate::lobby::pool::{Bot, BotPool};
use crate::model::InhouseSpec;

/// Front door for all lobby operations.
///
/// Owns the bot pool and sequences allocation, creation and teardown so the
/// rest of the crate never touches a [`Bot`] directly.
pub struct LobbyCoordinator {
    db: DatabaseConnection,
    pool: Arc<BotPool>,
}

impl LobbyCoordinator {
    pub fn new(db: DatabaseConnection, pool: Arc<BotPool>) -> Self {
        LobbyCoordinator { db, pool }
    }

    /// Allocates a bot and creates a lobby for the event.
    ///
    /// The bot is released again if the relay rejects creation. Confirmed
    /// attendees with linked accounts are invited right away; invite
    /// failures are logged and do not fail the creation.
    ///
    /// # Returns
    ///
    /// The id of the bot now hosting the event.
    pub async fn create_lobby(
        &self,
        event: &entity::event::Model,
        spec: &InhouseSpec,
    ) -> Result<i32, CreateLobbyError> {
        let bot = self.pool.acquire().ok_or(CreateLobbyError::NoAvailableBot)?;

        if let Err(err) = bot.create_lobby(event, spec).await {
            bot.release();
            return Err(CreateLobbyError::Rejected(err));
        }

        self.invite_confirmed(&bot, event.id).await;
        Ok(bot.id)
    }

    async fn invite_confirmed(&self, bot: &Arc<Bot>, event_id: i32) {
        let confirms = match ConfirmRepository::new(&self.db).get_by_event(event_id).await {
            Ok(confirms) => confirms,
            Err(err) => {
                error!(event = event_id, "failed to load confirms for invites: {err}");
                return;
            }
        };

        let players = PlayerRepository::new(&self.db);
        for confirm in confirms.iter().filter(|c| c.attends) {
            let steam_id = match players.find_by_discord(&confirm.user_id).await {
                Ok(Some(player)) => player.steam_id,
                Ok(None) => None,
                Err(err) => {
                    warn!(user = %confirm.user_id, "player lookup failed: {err}");
                    continue;
                }
            };
            let Some(steam_id) = steam_id else { continue };
            if let Err(err) = bot.invite_player(&steam_id).await {
                warn!(user = %confirm.user_id, "lobby invite failed: {err}");
            }
        }
    }

    /// Re-sends a lobby invite to one attendee.
    pub async fn invite(&self, event_id: i32, discord_id: &str) -> Result<(), AppError> {
        let bot = self
            .pool
            .lookup(event_id)
            .ok_or_else(|| AppError::NotFound(format!("no lobby for event {event_id}")))?;

        let player = PlayerRepository::new(&self.db)
            .find_by_discord(discord_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("player {discord_id} is not registered")))?;
        let steam_id = player
            .steam_id
            .ok_or_else(|| AppError::NotFound(format!("player {discord_id} has no linked account")))?;

        bot.invite_player(&steam_id).await?;
        Ok(())
    }

    /// Launches the event's lobby immediately, skipping the seat gate.
    pub fn force_start(&self, event_id: i32) -> Result<(), AppError> {
        let bot = self
            .pool
            .lookup(event_id)
            .ok_or_else(|| AppError::NotFound(format!("no lobby for event {event_id}")))?;

        let db = self.db.clone();
        tokio::spawn(async move {
            if let Err(err) = Bot::start(bot, db, true).await {
                error!(event = event_id, "forced start failed: {err}");
            }
        });
        Ok(())
    }

    /// Closes the event's lobby, immediately when forced, otherwise after
    /// the usual grace period.
    pub fn close(&self, event_id: i32, force: bool) -> Result<(), CloseLobbyError> {
        let bot = self
            .pool
            .lookup(event_id)
            .ok_or(CloseLobbyError::NotInLobby(event_id))?;

        let db = self.db.clone();
        tokio::spawn(async move {
            if let Err(err) = bot.close(&db, force).await {
                error!(event = event_id, "lobby close failed: {err}");
            }
        });
        Ok(())
    }

    /// Name and password of the event's lobby, if one is hosted.
    pub fn lobby_details(&self, event_id: i32) -> Option<(String, String)> {
        self.pool
            .lookup(event_id)
            .and_then(|bot| bot.session_snapshot())
            .map(|session| (session.name, session.password))
    }

    /// Hosting state of every bot, in id order.
    pub fn bot_statuses(&self) -> Vec<(i32, Option<i32>)> {
        self.pool
            .bots()
            .iter()
            .map(|bot| (bot.id, bot.current_event()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::test_support::MockNetwork;
    use crate::model::{FirstPick, GameMode, ServerRegion};
    use test_utils::builder::TestBuilder;
    use test_utils::factory::confirm::create_confirm;
    use test_utils::factory::event::create_event;
    use test_utils::factory::player::{create_player, create_unlinked_player};

    fn spec() -> InhouseSpec {
        InhouseSpec {
            game_mode: GameMode::AllPick,
            server: ServerRegion::UsEast,
            first_pick: FirstPick::Random,
            auto_balance: false,
        }
    }

    fn coordinator_with(
        db: &DatabaseConnection,
        networks: Vec<Arc<MockNetwork>>,
    ) -> LobbyCoordinator {
        let bots = networks
            .into_iter()
            .enumerate()
            .map(|(n, network)| {
                let network: Arc<dyn crate::lobby::network::LobbyNetwork> = network;
                Arc::new(Bot::new(n as i32 + 1, network, true, false))
            })
            .collect();
        LobbyCoordinator::new(db.clone(), Arc::new(BotPool::new(bots)))
    }

    #[tokio::test]
    async fn create_lobby_fails_when_every_bot_is_hosting() {
        let test = TestBuilder::new().with_event_tables().build().await.unwrap();
        let first = create_event(test.db()).await.unwrap();
        let second = create_event(test.db()).await.unwrap();

        let coordinator = coordinator_with(test.db(), vec![Arc::new(MockNetwork::new())]);
        coordinator.create_lobby(&first, &spec()).await.unwrap();

        match coordinator.create_lobby(&second, &spec()).await {
            Err(CreateLobbyError::NoAvailableBot) => {}
            other => panic!("expected pool exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_creation_returns_the_bot_to_the_pool() {
        let test = TestBuilder::new().with_event_tables().build().await.unwrap();
        let event = create_event(test.db()).await.unwrap();

        let coordinator = coordinator_with(test.db(), vec![Arc::new(MockNetwork::rejecting())]);
        match coordinator.create_lobby(&event, &spec()).await {
            Err(CreateLobbyError::Rejected(_)) => {}
            other => panic!("expected rejection, got {other:?}"),
        }

        // The bot must be claimable again after the failure.
        let (bot_id, hosting) = coordinator.bot_statuses()[0];
        assert_eq!(bot_id, 1);
        assert_eq!(hosting, None);
    }

    #[tokio::test]
    async fn linked_attendees_are_invited_on_creation() {
        let test = TestBuilder::new().with_event_tables().build().await.unwrap();
        let event = create_event(test.db()).await.unwrap();

        let linked = create_player(test.db()).await.unwrap();
        let unlinked = create_unlinked_player(test.db()).await.unwrap();
        create_confirm(test.db(), event.id, &linked.discord_id, true)
            .await
            .unwrap();
        create_confirm(test.db(), event.id, &unlinked.discord_id, true)
            .await
            .unwrap();

        let network = Arc::new(MockNetwork::new());
        let coordinator = coordinator_with(test.db(), vec![network.clone()]);
        coordinator.create_lobby(&event, &spec()).await.unwrap();

        let invites: Vec<_> = network
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("invite:"))
            .collect();
        assert_eq!(invites, vec![format!("invite:{}", linked.steam_id.unwrap())]);
    }

    #[tokio::test]
    async fn lobby_details_expose_name_and_password() {
        let test = TestBuilder::new().with_event_tables().build().await.unwrap();
        let event = create_event(test.db()).await.unwrap();

        let coordinator = coordinator_with(test.db(), vec![Arc::new(MockNetwork::new())]);
        coordinator.create_lobby(&event, &spec()).await.unwrap();

        let (name, password) = coordinator.lobby_details(event.id).unwrap();
        assert_eq!(name, event.name);
        assert!(!password.is_empty());
        assert!(coordinator.lobby_details(event.id + 1).is_none());
    }
}
