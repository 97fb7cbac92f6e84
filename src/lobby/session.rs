//! Lifecycle of a single hosted lobby, from creation to launch and close.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::data::EventRepository;
use crate::error::AppError;
use crate::lobby::network::{LobbyOptions, LobbyUpdate, NetworkError};
use crate::lobby::pool::Bot;
use crate::model::{InhouseSpec, LobbyStatus};

/// Seated players required before the start countdown begins.
pub const PLAYERS_TO_START: usize = 10;

/// One-second ticks counted down before launch.
pub const COUNTDOWN_TICKS: u32 = 10;

/// Length of one countdown tick.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// How long the bot lingers in a launched lobby before leaving.
pub const CLOSE_GRACE: Duration = Duration::from_secs(30);

/// Password characters chosen to avoid lookalike glyphs when read aloud.
const PASSWORD_CHARS: &[u8] = b"BDEFGHCJKLMNPQRSTWXYZ2356798";
const PASSWORD_LEN: usize = 20;

/// State a bot keeps while hosting one event's lobby.
#[derive(Clone, Debug)]
pub struct LobbySession {
    pub event_id: i32,
    pub name: String,
    pub password: String,
    pub chat_channel: Option<String>,
    pub auto_balance: bool,
    pub match_id_saved: bool,
    pub last_seated: usize,
}

impl LobbySession {
    pub fn new(event_id: i32, name: String, password: String) -> Self {
        LobbySession {
            event_id,
            name,
            password,
            chat_channel: None,
            auto_balance: false,
            match_id_saved: false,
            last_seated: 0,
        }
    }
}

fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..PASSWORD_LEN)
        .map(|_| PASSWORD_CHARS[rng.random_range(0..PASSWORD_CHARS.len())] as char)
        .collect()
}

impl Bot {
    /// Creates a hosted lobby for the given event and installs the session.
    ///
    /// Any stale lobby left from a previous session is abandoned first. The
    /// bot vacates its own player slot right after creation so that only
    /// human players count toward the start gate.
    pub async fn create_lobby(
        &self,
        event: &entity::event::Model,
        spec: &InhouseSpec,
    ) -> Result<(), NetworkError> {
        if self.in_lobby() {
            if let Err(err) = self.network.leave_lobby().await {
                warn!(bot = self.id, "failed to leave stale lobby: {err}");
            }
        }

        let password = generate_password();
        let options = LobbyOptions {
            game_name: event.name.clone(),
            pass_key: password.clone(),
            server: spec.server,
            game_mode: spec.game_mode,
            first_pick: spec.first_pick,
            allow_spectating: true,
        };

        self.network.create_lobby(&options).await?;

        if let Err(err) = self.network.kick_own_slot().await {
            warn!(bot = self.id, "failed to vacate own slot: {err}");
        }

        let mut session = LobbySession::new(event.id, event.name.clone(), password);
        session.auto_balance = spec.auto_balance;
        self.install_session(session);

        info!(bot = self.id, event = event.id, "lobby created");
        Ok(())
    }

    /// Applies one relay snapshot to the hosted session.
    ///
    /// Joins the lobby chat on the first update, announces seat-count
    /// changes, arms the autostart countdown at the gate, and latches the
    /// match id into the event row the first time the relay reports one.
    pub async fn handle_update(
        self: &Arc<Self>,
        db: &DatabaseConnection,
        update: LobbyUpdate,
    ) -> Result<(), AppError> {
        let Some(event_id) = self.current_event() else {
            return Ok(());
        };

        let needs_chat_join = self.with_session(|s| s.chat_channel.is_none()) == Some(true);
        if needs_chat_join {
            let channel = format!("Lobby_{}", update.lobby_id);
            if let Err(err) = self.network.join_chat(&channel).await {
                warn!(bot = self.id, "failed to join lobby chat: {err}");
            }
            self.with_session(|s| s.chat_channel = Some(channel));
        }

        let seated = update.seated();
        let seated_changed = self
            .with_session(|s| {
                let changed = s.last_seated != seated;
                s.last_seated = seated;
                changed
            })
            .unwrap_or(false);

        self.enough_players
            .store(seated >= PLAYERS_TO_START, Ordering::Release);

        let starting = self.starting.load(Ordering::Acquire);
        if seated_changed && !starting {
            self.send_lobby_message(&format!("{seated}/{PLAYERS_TO_START} players are seated."))
                .await;
        }

        if seated >= PLAYERS_TO_START && self.autostart && !starting {
            let bot = self.clone();
            let db = db.clone();
            tokio::spawn(async move {
                if let Err(err) = Bot::start(bot, db, false).await {
                    error!("lobby start failed: {err}");
                }
            });
        }

        if update.match_id != 0 && self.save_match_ids {
            // Latched only after the write lands so a failure retries on the
            // next snapshot instead of dropping the match id.
            let already_saved = self.with_session(|s| s.match_id_saved).unwrap_or(true);
            if !already_saved {
                EventRepository::new(db)
                    .set_match_id(event_id, &update.match_id.to_string())
                    .await?;
                self.with_session(|s| s.match_id_saved = true);
                info!(event = event_id, match_id = update.match_id, "match id saved");
            }
        }

        Ok(())
    }

    /// Counts down and launches the lobby.
    ///
    /// The unforced countdown re-checks the seat gate every tick and aborts
    /// if anyone leaves a playing slot. A forced start runs the same
    /// countdown without the gate. After launch the bot closes its side of
    /// the lobby through the normal grace path, freeing itself for the next
    /// event.
    pub async fn start(bot: Arc<Bot>, db: DatabaseConnection, force: bool) -> Result<(), AppError> {
        if bot
            .starting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        if force {
            bot.send_lobby_message("Game start was forced.").await;
        }
        for tick in (1..=COUNTDOWN_TICKS).rev() {
            if !force && !bot.enough_players.load(Ordering::Acquire) {
                bot.send_lobby_message("Aborting start: someone left.").await;
                bot.starting.store(false, Ordering::Release);
                return Ok(());
            }
            bot.send_lobby_message(&format!("Starting in {tick}...")).await;
            tokio::time::sleep(bot.countdown_tick).await;
        }

        let auto_balance = bot.with_session(|s| s.auto_balance).unwrap_or(false);
        if auto_balance {
            if let Err(err) = bot.network.balanced_shuffle().await {
                warn!(bot = bot.id, "balanced shuffle failed: {err}");
            }
        }

        bot.send_lobby_message("Game starting, good luck!").await;
        bot.network
            .launch_lobby()
            .await
            .map_err(AppError::NetworkErr)?;
        info!(bot = bot.id, event = bot.current_event(), "lobby launched");

        bot.close(&db, false).await?;
        Ok(())
    }

    /// Leaves the hosted lobby and returns the bot to the pool.
    ///
    /// Unless forced, waits a grace period first so launched games are not
    /// disturbed while players load in.
    pub async fn close(&self, db: &DatabaseConnection, force: bool) -> Result<(), AppError> {
        let Some(event_id) = self.current_event() else {
            return Ok(());
        };

        if !force {
            tokio::time::sleep(self.close_grace).await;
        }

        self.send_lobby_message("I am leaving this lobby, it is all yours now.")
            .await;
        if let Err(err) = self.network.leave_lobby().await {
            warn!(bot = self.id, "failed to leave lobby: {err}");
        }

        let events = EventRepository::new(db);
        events.set_lobby_status(event_id, LobbyStatus::Closed).await?;
        events.set_lobby_bot(event_id, None).await?;

        self.release();
        info!(bot = self.id, event = event_id, "lobby closed");
        Ok(())
    }

    /// Sends a lobby invite for the given account.
    pub async fn invite_player(&self, steam_id: &str) -> Result<(), NetworkError> {
        self.network.invite(steam_id).await
    }

    /// Sends a chat line to the lobby channel, logging but swallowing
    /// failures since chat is best effort.
    pub async fn send_lobby_message(&self, message: &str) {
        let Some(channel) = self.with_session(|s| s.chat_channel.clone()).flatten() else {
            return;
        };
        if let Err(err) = self.network.send_chat(&channel, message).await {
            warn!(bot = self.id, "failed to send lobby chat: {err}");
        }
    }

    /// Consumes relay updates for one bot until the relay channel closes.
    pub async fn drive(bot: Arc<Bot>, db: DatabaseConnection, mut rx: mpsc::Receiver<LobbyUpdate>) {
        while let Some(update) = rx.recv().await {
            if let Err(err) = bot.handle_update(&db, update).await {
                error!(bot = bot.id, "failed to apply lobby update: {err}");
            }
        }
        info!(bot = bot.id, "relay update stream closed");
    }
}
