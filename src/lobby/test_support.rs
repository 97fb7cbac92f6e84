//! In-memory relay stand-in for lobby tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::lobby::network::{LobbyNetwork, LobbyOptions, NetworkError};

/// Records every relay call and can be told to reject lobby creation.
pub struct MockNetwork {
    calls: Mutex<Vec<String>>,
    fail_create: AtomicBool,
}

impl MockNetwork {
    pub fn new() -> Self {
        MockNetwork {
            calls: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
        }
    }

    pub fn rejecting() -> Self {
        let mock = MockNetwork::new();
        mock.fail_create.store(true, Ordering::Relaxed);
        mock
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("chat:").map(str::to_string))
            .collect()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c == name || c.starts_with(&format!("{name}:")))
    }
}

impl Default for MockNetwork {
    fn default() -> Self {
        MockNetwork::new()
    }
}

#[async_trait]
impl LobbyNetwork for MockNetwork {
    async fn create_lobby(&self, options: &LobbyOptions) -> Result<(), NetworkError> {
        if self.fail_create.load(Ordering::Relaxed) {
            return Err(NetworkError::Rejected { code: 2 });
        }
        self.record(format!("create_lobby:{}", options.game_name));
        Ok(())
    }

    async fn leave_lobby(&self) -> Result<(), NetworkError> {
        self.record("leave_lobby".into());
        Ok(())
    }

    async fn kick_own_slot(&self) -> Result<(), NetworkError> {
        self.record("kick_own_slot".into());
        Ok(())
    }

    async fn balanced_shuffle(&self) -> Result<(), NetworkError> {
        self.record("balanced_shuffle".into());
        Ok(())
    }

    async fn launch_lobby(&self) -> Result<(), NetworkError> {
        self.record("launch_lobby".into());
        Ok(())
    }

    async fn invite(&self, steam_id: &str) -> Result<(), NetworkError> {
        self.record(format!("invite:{steam_id}"));
        Ok(())
    }

    async fn join_chat(&self, channel: &str) -> Result<(), NetworkError> {
        self.record(format!("join_chat:{channel}"));
        Ok(())
    }

    async fn send_chat(&self, _channel: &str, message: &str) -> Result<(), NetworkError> {
        self.record(format!("chat:{message}"));
        Ok(())
    }
}
