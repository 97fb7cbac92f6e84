//! Prefix command parsing and dispatch.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::data::{ConfirmRepository, EventRepository, PlayerRepository};
use crate::error::lobby::CloseLobbyError;
use crate::error::AppError;
use crate::lobby::LobbyCoordinator;
use crate::model::{FirstPick, GameMode, InhouseSpec, ServerRegion};
use crate::service::{
    AddInhouseOutcome, ConfirmOutcome, ConfirmationService, EventService, SummaryRenderer,
};

const DEFAULT_CAPACITY: i32 = 10;

/// Where a command's response goes.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Posted in the channel the command came from.
    Channel(String),
    /// Sent privately, for lobby passwords.
    Dm(String),
}

/// Everything command handlers need.
pub struct CommandContext {
    pub db: DatabaseConnection,
    pub coordinator: Arc<LobbyCoordinator>,
    pub renderer: Arc<dyn SummaryRenderer>,
    pub confirmations: ConfirmationService,
    pub events: EventService,
}

impl CommandContext {
    pub fn new(
        db: DatabaseConnection,
        coordinator: Arc<LobbyCoordinator>,
        renderer: Arc<dyn SummaryRenderer>,
    ) -> Self {
        let confirmations = ConfirmationService::new(db.clone(), coordinator.clone());
        let events = EventService::new(db.clone(), coordinator.clone());
        CommandContext {
            db,
            coordinator,
            renderer,
            confirmations,
            events,
        }
    }

    async fn refresh_summary(&self, event_id: i32) {
        let event = match EventRepository::new(&self.db).get(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(err) => {
                warn!(event = event_id, "summary reload failed: {err}");
                return;
            }
        };
        if let Err(err) = self.renderer.refresh(&event).await {
            warn!(event = event_id, "summary refresh failed: {err}");
        }
    }
}

/// Splits a command line into arguments, honoring double quotes so event
/// names and times can contain spaces.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_event_id(token: Option<&String>) -> Result<i32, Reply> {
    token
        .and_then(|t| t.trim_start_matches('#').parse().ok())
        .ok_or_else(|| Reply::Channel("I need an event id, like `#3`.".to_string()))
}

fn parse_time(token: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Routes one command line to its handler.
///
/// # Arguments
///
/// * `ctx` - Shared services.
/// * `author_id` - Discord id of the commanding user.
/// * `input` - The message content with the prefix already stripped.
pub async fn dispatch(
    ctx: &CommandContext,
    author_id: &str,
    input: &str,
) -> Result<Reply, AppError> {
    let tokens = tokenize(input);
    let Some(command) = tokens.first() else {
        return Ok(Reply::Channel(usage()));
    };
    let args = &tokens[1..];

    match command.as_str() {
        "confirm" => confirm(ctx, author_id, args).await,
        "create" => create(ctx, args).await,
        "add-inhouse" => add_inhouse(ctx, args).await,
        "quick-inhouse" => quick_inhouse(ctx).await,
        "kick" => kick(ctx, args).await,
        "force-lobby-start" => force_lobby_start(ctx, args).await,
        "close-lobby" => close_lobby(ctx, args).await,
        "resend-invite" => resend_invite(ctx, author_id, args).await,
        "get-lobby" => get_lobby(ctx, args),
        "status" => Ok(status(ctx)),
        "link-steam" => link_steam(ctx, author_id, args).await,
        "remove-event" => remove_event(ctx, args).await,
        "help" => Ok(Reply::Channel(usage())),
        other => Ok(Reply::Channel(format!(
            "Unknown command `{other}`. Try `help`."
        ))),
    }
}

fn usage() -> String {
    [
        "Commands:",
        "`confirm <event> <yes|no>`",
        "`create \"<name>\" <\"YYYY-MM-DD HH:MM\"|now> [capacity]`",
        "`add-inhouse <event> <game mode> <server> [first pick] [no-balance]`",
        "`quick-inhouse`",
        "`kick <event> <user>`",
        "`force-lobby-start <event>`",
        "`close-lobby <event> [now]`",
        "`resend-invite <event>`",
        "`get-lobby <event>`",
        "`link-steam <steam id>`",
        "`remove-event <event>`",
        "`status`",
    ]
    .join("\n")
}

async fn confirm(
    ctx: &CommandContext,
    author_id: &str,
    args: &[String],
) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let attends = match args.get(1).map(String::as_str) {
        Some("yes") => true,
        Some("no") => false,
        _ => return Ok(Reply::Channel("Answer `yes` or `no`.".to_string())),
    };

    let outcome = ctx.confirmations.confirm(event_id, author_id, attends).await?;
    ctx.refresh_summary(event_id).await;

    let reply = match outcome {
        ConfirmOutcome::Updated if attends => format!("You are in for event #{event_id}."),
        ConfirmOutcome::Updated => format!("You are out of event #{event_id}."),
        ConfirmOutcome::EventFull => format!("Event #{event_id} is already full."),
        ConfirmOutcome::NeedsLinkedAccount => {
            "That event hosts a lobby, link your account first with `link-steam`.".to_string()
        }
    };
    Ok(Reply::Channel(reply))
}

async fn create(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let Some(name) = args.first() else {
        return Ok(Reply::Channel(
            "Usage: `create \"<name>\" <\"YYYY-MM-DD HH:MM\"|now> [capacity]`".to_string(),
        ));
    };
    let (time, instant) = match args.get(1).map(String::as_str) {
        Some("now") => (None, true),
        Some(token) => match parse_time(token) {
            Some(time) => (Some(time), false),
            None => {
                return Ok(Reply::Channel(
                    "I could not read that time, use `\"YYYY-MM-DD HH:MM\"` or `now`.".to_string(),
                ))
            }
        },
        None => {
            return Ok(Reply::Channel(
                "Tell me when: `\"YYYY-MM-DD HH:MM\"` or `now`.".to_string(),
            ))
        }
    };
    let capacity = match args.get(2) {
        Some(token) => match token.parse::<i32>() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => return Ok(Reply::Channel("Capacity must be a positive number.".to_string())),
        },
        None => DEFAULT_CAPACITY,
    };

    let event = ctx.events.create(name, time, instant, capacity).await?;
    ctx.refresh_summary(event.id).await;
    Ok(Reply::Channel(format!(
        "Created event #{} `{}`. Answer with `confirm {} yes`.",
        event.id, event.name, event.id
    )))
}

async fn add_inhouse(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let Some(mode_token) = args.get(1) else {
        return Ok(Reply::Channel(
            "Usage: `add-inhouse <event> <game mode> <server> [first pick] [no-balance]`"
                .to_string(),
        ));
    };
    let game_mode: GameMode = match mode_token.parse() {
        Ok(mode) => mode,
        Err(err) => return Ok(Reply::Channel(format!("{err}."))),
    };
    let server: ServerRegion = match args.get(2).map(|t| t.parse()) {
        Some(Ok(server)) => server,
        Some(Err(err)) => return Ok(Reply::Channel(format!("{err}."))),
        None => return Ok(Reply::Channel("Which server region?".to_string())),
    };

    let mut first_pick = FirstPick::Random;
    let mut auto_balance = true;
    for extra in args.iter().skip(3) {
        if extra == "no-balance" {
            auto_balance = false;
        } else {
            match extra.parse() {
                Ok(pick) => first_pick = pick,
                Err(err) => return Ok(Reply::Channel(format!("{err}."))),
            }
        }
    }

    let spec = InhouseSpec {
        game_mode,
        server,
        first_pick,
        auto_balance,
    };
    let outcome = ctx.events.add_inhouse(event_id, &spec).await?;
    ctx.refresh_summary(event_id).await;

    let reply = match outcome {
        AddInhouseOutcome::Added { kicked } if kicked.is_empty() => {
            format!("Event #{event_id} now hosts a lobby.")
        }
        AddInhouseOutcome::Added { kicked } => format!(
            "Event #{event_id} now hosts a lobby. Moved to waiting until they link an account: {}.",
            kicked
                .iter()
                .map(|id| format!("<@{id}>"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        AddInhouseOutcome::CapacityTooSmall => format!(
            "Event #{event_id} cannot seat a full game, raise its capacity first."
        ),
    };
    Ok(Reply::Channel(reply))
}

/// Creates an instant event that hosts a lobby with the default settings,
/// in one step.
async fn quick_inhouse(ctx: &CommandContext) -> Result<Reply, AppError> {
    let event = ctx.events.create("Inhouse", None, true, DEFAULT_CAPACITY).await?;
    let spec = InhouseSpec {
        game_mode: GameMode::CaptainsMode,
        server: ServerRegion::Luxembourg,
        first_pick: FirstPick::Random,
        auto_balance: true,
    };
    ctx.events.add_inhouse(event.id, &spec).await?;
    ctx.refresh_summary(event.id).await;
    Ok(Reply::Channel(format!(
        "Your inhouse is ready as event #{}. Answer with `confirm {} yes`.",
        event.id, event.id
    )))
}

/// Accepts a raw Discord id or a `<@id>` / `<@!id>` mention.
fn parse_user_id(token: &str) -> String {
    token
        .trim_start_matches("<@")
        .trim_start_matches('!')
        .trim_end_matches('>')
        .to_string()
}

async fn kick(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let Some(user_token) = args.get(1) else {
        return Ok(Reply::Channel("Usage: `kick <event> <user>`".to_string()));
    };
    let user_id = parse_user_id(user_token);

    if EventRepository::new(&ctx.db).get(event_id).await?.is_none() {
        return Ok(Reply::Channel(format!("Event #{event_id} does not exist.")));
    }
    let confirms = ConfirmRepository::new(&ctx.db).get_by_event(event_id).await?;
    if !confirms.iter().any(|c| c.user_id == user_id) {
        return Ok(Reply::Channel(format!(
            "<@{user_id}> has not answered for event #{event_id}."
        )));
    }

    ConfirmRepository::new(&ctx.db)
        .delete_one(event_id, &user_id)
        .await?;
    ctx.refresh_summary(event_id).await;
    Ok(Reply::Channel(format!(
        "<@{user_id}> was kicked from event #{event_id}. They can answer again at any time."
    )))
}

async fn force_lobby_start(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    match ctx.coordinator.force_start(event_id) {
        Ok(()) => Ok(Reply::Channel(format!("Starting event #{event_id}'s lobby now."))),
        Err(AppError::NotFound(msg)) => Ok(Reply::Channel(msg)),
        Err(err) => Err(err),
    }
}

async fn close_lobby(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let force = args.get(1).map(String::as_str) == Some("now");

    match ctx.coordinator.close(event_id, force) {
        Ok(()) if force => Ok(Reply::Channel(format!("Closing event #{event_id}'s lobby."))),
        Ok(()) => Ok(Reply::Channel(format!(
            "Closing event #{event_id}'s lobby shortly."
        ))),
        Err(CloseLobbyError::NotInLobby(_)) => Ok(Reply::Channel(format!(
            "No lobby is open for event #{event_id}."
        ))),
    }
}

async fn resend_invite(
    ctx: &CommandContext,
    author_id: &str,
    args: &[String],
) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    match ctx.coordinator.invite(event_id, author_id).await {
        Ok(()) => Ok(Reply::Channel("Invite sent, check your game client.".to_string())),
        Err(AppError::NotFound(msg)) => Ok(Reply::Channel(msg)),
        Err(err) => Err(err),
    }
}

fn get_lobby(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    match ctx.coordinator.lobby_details(event_id) {
        Some((name, password)) => Ok(Reply::Dm(format!(
            "Lobby `{name}`, password `{password}`."
        ))),
        None => Ok(Reply::Channel(format!("No lobby is open for event #{event_id}."))),
    }
}

fn status(ctx: &CommandContext) -> Reply {
    let lines: Vec<String> = ctx
        .coordinator
        .bot_statuses()
        .into_iter()
        .map(|(bot_id, hosting)| match hosting {
            Some(event_id) => format!("bot {bot_id}: hosting event #{event_id}"),
            None => format!("bot {bot_id}: idle"),
        })
        .collect();
    Reply::Channel(lines.join("\n"))
}

async fn link_steam(
    ctx: &CommandContext,
    author_id: &str,
    args: &[String],
) -> Result<Reply, AppError> {
    let Some(steam_id) = args.first() else {
        return Ok(Reply::Channel("Usage: `link-steam <steam id>`".to_string()));
    };
    if steam_id.parse::<u64>().is_err() {
        return Ok(Reply::Channel(
            "That does not look like a 64-bit account id.".to_string(),
        ));
    }

    PlayerRepository::new(&ctx.db)
        .upsert_link(author_id, steam_id)
        .await?;
    Ok(Reply::Channel("Account linked.".to_string()))
}

async fn remove_event(ctx: &CommandContext, args: &[String]) -> Result<Reply, AppError> {
    let event_id = match parse_event_id(args.first()) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let Some(event) = EventRepository::new(&ctx.db).get(event_id).await? else {
        return Ok(Reply::Channel(format!("Event #{event_id} does not exist.")));
    };

    if let Err(err) = ctx.renderer.remove(&event).await {
        warn!(event = event_id, "summary removal failed: {err}");
    }
    ctx.events.delete(event_id).await?;
    Ok(Reply::Channel(format!("Event #{event_id} removed.")))
}
