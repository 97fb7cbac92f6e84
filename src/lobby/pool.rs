//! Fixed pool of game-client bots available for hosting lobbies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::lobby::network::LobbyNetwork;
use crate::lobby::session::{LobbySession, CLOSE_GRACE, COUNTDOWN_TICK};

/// One game-client bot and its current hosting state.
///
/// `busy` is the reservation flag: the allocator claims a bot by flipping it
/// with a compare-exchange, so two concurrent lobby creations can never land
/// on the same bot. The session itself lives behind a plain mutex that is
/// only held for short reads and writes, never across an await.
pub struct Bot {
    pub id: i32,
    pub network: Arc<dyn LobbyNetwork>,
    pub autostart: bool,
    pub save_match_ids: bool,
    pub(crate) countdown_tick: Duration,
    pub(crate) close_grace: Duration,
    session: Mutex<Option<LobbySession>>,
    busy: AtomicBool,
    pub(crate) starting: AtomicBool,
    pub(crate) enough_players: AtomicBool,
}

impl Bot {
    pub fn new(
        id: i32,
        network: Arc<dyn LobbyNetwork>,
        autostart: bool,
        save_match_ids: bool,
    ) -> Self {
        Bot {
            id,
            network,
            autostart,
            save_match_ids,
            countdown_tick: COUNTDOWN_TICK,
            close_grace: CLOSE_GRACE,
            session: Mutex::new(None),
            busy: AtomicBool::new(false),
            starting: AtomicBool::new(false),
            enough_players: AtomicBool::new(false),
        }
    }

    /// Drops the countdown and close delays so lifecycle tests finish
    /// without waiting out real time.
    #[cfg(test)]
    pub(crate) fn with_immediate_pace(mut self) -> Self {
        self.countdown_tick = Duration::ZERO;
        self.close_grace = Duration::ZERO;
        self
    }

    /// Attempts to claim this bot for a new lobby. Succeeds for exactly one
    /// caller until [`Bot::release`] runs.
    pub fn try_reserve(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clears all hosting state and returns the bot to the pool.
    pub fn release(&self) {
        *self.session.lock().unwrap() = None;
        self.starting.store(false, Ordering::Release);
        self.enough_players.store(false, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }

    pub fn install_session(&self, session: LobbySession) {
        *self.session.lock().unwrap() = Some(session);
    }

    pub fn in_lobby(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    pub fn current_event(&self) -> Option<i32> {
        self.session.lock().unwrap().as_ref().map(|s| s.event_id)
    }

    pub fn session_snapshot(&self) -> Option<LobbySession> {
        self.session.lock().unwrap().clone()
    }

    /// Runs `f` against the live session, if any.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut LobbySession) -> T) -> Option<T> {
        self.session.lock().unwrap().as_mut().map(f)
    }
}

/// All configured bots, in ascending id order.
pub struct BotPool {
    bots: Vec<Arc<Bot>>,
}

impl BotPool {
    pub fn new(mut bots: Vec<Arc<Bot>>) -> Self {
        bots.sort_by_key(|b| b.id);
        BotPool { bots }
    }

    /// Reserves the free bot with the lowest id, or `None` when every bot is
    /// hosting.
    pub fn acquire(&self) -> Option<Arc<Bot>> {
        self.bots.iter().find(|b| b.try_reserve()).cloned()
    }

    /// Finds the bot currently hosting the given event.
    pub fn lookup(&self, event_id: i32) -> Option<Arc<Bot>> {
        self.bots
            .iter()
            .find(|b| b.current_event() == Some(event_id))
            .cloned()
    }

    pub fn get(&self, bot_id: i32) -> Option<Arc<Bot>> {
        self.bots.iter().find(|b| b.id == bot_id).cloned()
    }

    pub fn bots(&self) -> &[Arc<Bot>] {
        &self.bots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::test_support::MockNetwork;

    fn pool_of(n: i32) -> BotPool {
        BotPool::new(
            (1..=n)
                .map(|id| Arc::new(Bot::new(id, Arc::new(MockNetwork::new()), true, false)))
                .collect(),
        )
    }

    #[test]
    fn acquire_prefers_the_lowest_free_id() {
        let pool = pool_of(3);
        assert_eq!(pool.acquire().unwrap().id, 1);
        assert_eq!(pool.acquire().unwrap().id, 2);
    }

    #[test]
    fn acquire_returns_none_when_exhausted() {
        let pool = pool_of(1);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_none());
    }

    #[test]
    fn release_returns_the_bot_to_the_pool() {
        let pool = pool_of(1);
        let bot = pool.acquire().unwrap();
        bot.release();
        assert_eq!(pool.acquire().unwrap().id, 1);
    }

    #[test]
    fn reservation_is_exclusive_under_contention() {
        let bot = Arc::new(Bot::new(1, Arc::new(MockNetwork::new()), true, false));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bot = bot.clone();
                std::thread::spawn(move || bot.try_reserve())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
    }

    #[test]
    fn lookup_matches_the_hosting_bot() {
        let pool = pool_of(2);
        let bot = pool.acquire().unwrap();
        bot.install_session(LobbySession::new(42, "Test".into(), "pw".into()));

        assert_eq!(pool.lookup(42).unwrap().id, bot.id);
        assert!(pool.lookup(99).is_none());
    }
}
