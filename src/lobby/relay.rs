//! TCP client for the game-client relay process.
//!
//! The relay speaks line-delimited JSON. Every command carries a sequence
//! number the relay echoes back in its acknowledgement, so responses can be
//! matched to callers regardless of ordering. Lobby state snapshots arrive
//! unsolicited and are forwarded on a channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};

use crate::lobby::network::{LobbyMember, LobbyNetwork, LobbyOptions, LobbyUpdate, NetworkError};

const UPDATE_BUFFER: usize = 32;

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command<'a> {
    CreateLobby { options: &'a LobbyOptions },
    LeaveLobby,
    KickOwnSlot,
    BalancedShuffle,
    LaunchLobby,
    Invite { steam_id: &'a str },
    JoinChat { channel: &'a str },
    SendChat { channel: &'a str, message: &'a str },
}

#[derive(Serialize)]
struct Envelope<'a> {
    seq: u64,
    #[serde(flatten)]
    command: Command<'a>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Inbound {
    Ack {
        seq: u64,
        ok: bool,
        #[serde(default)]
        code: u32,
    },
    Update {
        lobby_id: u64,
        #[serde(default)]
        match_id: u64,
        members: Vec<LobbyMember>,
    },
}

struct Ack {
    ok: bool,
    code: u32,
}

type PendingAcks = Arc<StdMutex<HashMap<u64, oneshot::Sender<Ack>>>>;

/// Connection to one relay process, one per bot.
pub struct RelayClient {
    writer: Mutex<OwnedWriteHalf>,
    seq: AtomicU64,
    pending: PendingAcks,
}

impl RelayClient {
    /// Connects to a relay and starts the read loop.
    ///
    /// # Returns
    ///
    /// The client plus the channel on which lobby snapshots arrive. The
    /// channel closes when the relay connection drops.
    pub async fn connect(
        addr: &str,
    ) -> Result<(Arc<RelayClient>, mpsc::Receiver<LobbyUpdate>), NetworkError> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();

        let pending: PendingAcks = Arc::new(StdMutex::new(HashMap::new()));
        let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);

        tokio::spawn(read_loop(read_half, pending.clone(), update_tx));

        let client = Arc::new(RelayClient {
            writer: Mutex::new(write_half),
            seq: AtomicU64::new(1),
            pending,
        });

        Ok((client, update_rx))
    }

    async fn call(&self, command: Command<'_>) -> Result<(), NetworkError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(seq, tx);

        let mut line = serde_json::to_string(&Envelope { seq, command })?;
        line.push('\n');

        let write_result = {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await
        };
        if let Err(err) = write_result {
            self.pending.lock().unwrap().remove(&seq);
            return Err(NetworkError::Io(err));
        }

        match rx.await {
            Ok(Ack { ok: true, .. }) => Ok(()),
            Ok(Ack { ok: false, code }) => Err(NetworkError::Rejected { code }),
            Err(_) => Err(NetworkError::Disconnected(
                "relay closed before acknowledging".into(),
            )),
        }
    }
}

/// Reads inbound lines, routing acks to their waiting callers and snapshots
/// to the update channel. Dropping the pending senders on exit wakes every
/// in-flight call with a disconnect error.
async fn read_loop(
    read_half: OwnedReadHalf,
    pending: PendingAcks,
    updates: mpsc::Sender<LobbyUpdate>,
) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!("relay read failed: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Inbound>(&line) {
            Ok(Inbound::Ack { seq, ok, code }) => {
                let waiter = pending.lock().unwrap().remove(&seq);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(Ack { ok, code });
                    }
                    None => debug!(seq, "ack without a waiting call"),
                }
            }
            Ok(Inbound::Update {
                lobby_id,
                match_id,
                members,
            }) => {
                let update = LobbyUpdate {
                    lobby_id,
                    match_id,
                    members,
                };
                if updates.send(update).await.is_err() {
                    break;
                }
            }
            Err(err) => warn!("unparseable relay message: {err}"),
        }
    }

    pending.lock().unwrap().clear();
}

#[async_trait]
impl LobbyNetwork for RelayClient {
    async fn create_lobby(&self, options: &LobbyOptions) -> Result<(), NetworkError> {
        self.call(Command::CreateLobby { options }).await
    }

    async fn leave_lobby(&self) -> Result<(), NetworkError> {
        self.call(Command::LeaveLobby).await
    }

    async fn kick_own_slot(&self) -> Result<(), NetworkError> {
        self.call(Command::KickOwnSlot).await
    }

    async fn balanced_shuffle(&self) -> Result<(), NetworkError> {
        self.call(Command::BalancedShuffle).await
    }

    async fn launch_lobby(&self) -> Result<(), NetworkError> {
        self.call(Command::LaunchLobby).await
    }

    async fn invite(&self, steam_id: &str) -> Result<(), NetworkError> {
        self.call(Command::Invite { steam_id }).await
    }

    async fn join_chat(&self, channel: &str) -> Result<(), NetworkError> {
        self.call(Command::JoinChat { channel }).await
    }

    async fn send_chat(&self, channel: &str, message: &str) -> Result<(), NetworkError> {
        self.call(Command::SendChat { channel, message }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn relay_pair() -> (Arc<RelayClient>, mpsc::Receiver<LobbyUpdate>, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        let (client, updates) = RelayClient::connect(&addr).await.unwrap();
        let server = accept.await.unwrap();

        (client, updates, server)
    }

    async fn read_line(server: &mut BufReader<TcpStream>) -> serde_json::Value {
        let mut line = String::new();
        server.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn acked_call_resolves_ok() {
        let (client, _updates, server) = relay_pair().await;
        let mut server = BufReader::new(server);

        let call = tokio::spawn(async move { client.leave_lobby().await });

        let request = read_line(&mut server).await;
        assert_eq!(request["op"], "leave_lobby");
        let seq = request["seq"].as_u64().unwrap();

        let ack = format!("{{\"type\":\"ack\",\"seq\":{seq},\"ok\":true}}\n");
        server.get_mut().write_all(ack.as_bytes()).await.unwrap();

        assert!(call.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn rejected_call_carries_the_relay_code() {
        let (client, _updates, server) = relay_pair().await;
        let mut server = BufReader::new(server);

        let call = tokio::spawn(async move { client.launch_lobby().await });

        let request = read_line(&mut server).await;
        let seq = request["seq"].as_u64().unwrap();

        let ack = format!("{{\"type\":\"ack\",\"seq\":{seq},\"ok\":false,\"code\":7}}\n");
        server.get_mut().write_all(ack.as_bytes()).await.unwrap();

        match call.await.unwrap() {
            Err(NetworkError::Rejected { code }) => assert_eq!(code, 7),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn updates_are_forwarded_on_the_channel() {
        let (_client, mut updates, mut server) = relay_pair().await;

        let snapshot = concat!(
            "{\"type\":\"update\",\"lobby_id\":42,\"match_id\":0,",
            "\"members\":[{\"steam_id\":\"76561198000000001\",\"team\":\"radiant\"}]}\n",
        );
        server.write_all(snapshot.as_bytes()).await.unwrap();

        let update = updates.recv().await.unwrap();
        assert_eq!(update.lobby_id, 42);
        assert_eq!(update.seated(), 1);
    }

    #[tokio::test]
    async fn dropped_connection_fails_the_pending_call() {
        let (client, _updates, server) = relay_pair().await;
        let mut server = BufReader::new(server);

        let call = tokio::spawn(async move { client.kick_own_slot().await });
        let _ = read_line(&mut server).await;
        drop(server);

        match call.await.unwrap() {
            Err(NetworkError::Disconnected(_)) => {}
            other => panic!("expected disconnect, got {other:?}"),
        }
    }
}
