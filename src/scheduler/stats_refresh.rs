//! Periodic refresh of linked players' solo ratings.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::data::PlayerRepository;
use crate::error::AppError;
use crate::service::StatsClient;
use crate::util::request_scheduler::{schedule_requests, zip_params};

/// Starts the repeating rating refresh job.
pub async fn start_scheduler(
    db: DatabaseConnection,
    client: StatsClient,
    interval: Duration,
    min_request_interval: Duration,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;
    let client = Arc::new(client);

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let db = db.clone();
        let client = client.clone();
        Box::pin(async move {
            if let Err(err) = refresh_all_ratings(&db, &client, min_request_interval).await {
                error!("rating refresh failed: {err}");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!(interval_secs = interval.as_secs(), "rating refresh scheduler started");
    Ok(scheduler)
}

/// Fetches the solo rating of every linked player, paced to respect the
/// upstream rate limit, and stores the values that came back. Hidden or
/// unset ratings keep whatever value is already cached.
pub async fn refresh_all_ratings(
    db: &DatabaseConnection,
    client: &StatsClient,
    min_request_interval: Duration,
) -> Result<(), AppError> {
    let players = PlayerRepository::new(db);

    let linked = players.get_all_linked().await?;
    let ids: Vec<i32> = linked.iter().map(|p| p.id).collect();
    let steam_ids: Vec<String> = linked
        .iter()
        .filter_map(|p| p.steam_id.clone())
        .collect();
    let linked = zip_params(ids, steam_ids)
        .map_err(|err| AppError::InternalError(err.to_string()))?;
    let total = linked.len();

    let ratings = schedule_requests(
        min_request_interval,
        |(player_id, steam_id): (i32, String)| async move {
            client
                .solo_mmr(&steam_id)
                .await
                .map(|rating| (player_id, rating))
        },
        linked,
    )
    .await?;

    let mut updated = 0usize;
    for (player_id, rating) in ratings {
        if rating.is_some() {
            players.set_mmr(player_id, rating).await?;
            updated += 1;
        }
    }

    info!(total, updated, "rating refresh finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::builder::TestBuilder;
    use test_utils::factory::player::create_unlinked_player;

    #[tokio::test]
    async fn refresh_with_no_linked_players_makes_no_requests() {
        let test = TestBuilder::new().with_event_tables().build().await.unwrap();
        create_unlinked_player(test.db()).await.unwrap();

        // The client points nowhere; reaching it would fail the refresh.
        let client = StatsClient::new("http://127.0.0.1:1".to_string());
        refresh_all_ratings(test.db(), &client, Duration::from_millis(1))
            .await
            .unwrap();
    }
}
