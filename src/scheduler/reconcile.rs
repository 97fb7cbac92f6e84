//! Periodic reconciliation of durable event state with live lobbies.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::data::EventRepository;
use crate::error::lobby::CreateLobbyError;
use crate::error::AppError;
use crate::lobby::LobbyCoordinator;
use crate::model::{InhouseSpec, LobbyStatus};
use crate::service::SummaryRenderer;

/// Starts the repeating reconciliation job.
pub async fn start_scheduler(
    db: DatabaseConnection,
    coordinator: Arc<LobbyCoordinator>,
    renderer: Arc<dyn SummaryRenderer>,
    interval: Duration,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let db = db.clone();
        let coordinator = coordinator.clone();
        let renderer = renderer.clone();
        Box::pin(async move {
            if let Err(err) = reconcile_events(&db, &coordinator, renderer.as_ref()).await {
                error!("reconciliation tick failed: {err}");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!(interval_secs = interval.as_secs(), "reconciliation scheduler started");
    Ok(scheduler)
}

/// One reconciliation pass over every event.
///
/// Summaries are refreshed unconditionally so attendance changes show up
/// even when nothing else happens. Lobby creation runs for due events whose
/// status still allows it; a full pool is persisted as its own status and
/// retried on the next pass, while a relay rejection keeps the current
/// status so the normal cadence retries it too.
pub async fn reconcile_events(
    db: &DatabaseConnection,
    coordinator: &LobbyCoordinator,
    renderer: &dyn SummaryRenderer,
) -> Result<(), AppError> {
    let events = EventRepository::new(db);
    let now = Utc::now();

    for event in events.get_all().await? {
        if let Err(err) = renderer.refresh(&event).await {
            warn!(event = event.id, "summary refresh failed: {err}");
        }

        let Some(inhouse) = event.inhouse.as_ref() else {
            continue;
        };

        let status = LobbyStatus::parse(&event.lobby_status).unwrap_or(LobbyStatus::NotCreated);
        if !status.allows_creation() {
            continue;
        }

        let due = event.instant || event.time.is_some_and(|time| time <= now);
        if !due {
            continue;
        }

        let spec = match InhouseSpec::from_json(inhouse) {
            Ok(spec) => spec,
            Err(err) => {
                warn!(event = event.id, "unreadable lobby configuration: {err}");
                continue;
            }
        };

        let changed = match coordinator.create_lobby(&event, &spec).await {
            Ok(bot_id) => {
                events.set_lobby_bot(event.id, Some(bot_id)).await?;
                events.set_lobby_status(event.id, LobbyStatus::Created).await?;
                info!(event = event.id, bot = bot_id, "lobby created by reconciliation");
                true
            }
            Err(CreateLobbyError::NoAvailableBot) => {
                if status != LobbyStatus::NoAvailableBot {
                    events
                        .set_lobby_status(event.id, LobbyStatus::NoAvailableBot)
                        .await?;
                }
                warn!(event = event.id, "no free bot for due event");
                true
            }
            Err(CreateLobbyError::Rejected(err)) => {
                error!(event = event.id, "lobby creation rejected: {err}");
                false
            }
        };

        if changed {
            if let Some(updated) = events.get(event.id).await? {
                if let Err(err) = renderer.refresh(&updated).await {
                    warn!(event = event.id, "summary refresh failed: {err}");
                }
            }
        }
    }

    Ok(())
}
