use chrono::Utc;
use test_utils::builder::TestBuilder;
use test_utils::factory::confirm::create_confirm;
use test_utils::factory::event::{create_event, EventFactory};

use crate::data::{ConfirmRepository, EventRepository};
use crate::model::LobbyStatus;

#[tokio::test]
async fn create_sets_defaults() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = EventRepository::new(test.db());

    let time = Utc::now() + chrono::Duration::hours(2);
    let event = repo.create("Inhouse Night", Some(time), false, 12).await.unwrap();

    assert_eq!(event.name, "Inhouse Night");
    assert_eq!(event.capacity, 12);
    assert_eq!(event.lobby_status, LobbyStatus::NotCreated.as_code());
    assert!(event.lobby_bot_id.is_none());
    assert!(event.inhouse.is_none());
    assert!(event.match_id.is_none());
}

#[tokio::test]
async fn get_all_orders_by_id() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = EventRepository::new(test.db());

    let a = create_event(test.db()).await.unwrap();
    let b = create_event(test.db()).await.unwrap();

    let all = repo.get_all().await.unwrap();
    let ids: Vec<i32> = all.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn lobby_fields_update_independently() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = EventRepository::new(test.db());
    let event = create_event(test.db()).await.unwrap();

    repo.set_lobby_status(event.id, LobbyStatus::Created).await.unwrap();
    repo.set_lobby_bot(event.id, Some(3)).await.unwrap();
    repo.set_match_id(event.id, "8912345").await.unwrap();

    let stored = repo.get(event.id).await.unwrap().unwrap();
    assert_eq!(stored.lobby_status, LobbyStatus::Created.as_code());
    assert_eq!(stored.lobby_bot_id, Some(3));
    assert_eq!(stored.match_id.as_deref(), Some("8912345"));
    // Untouched columns survive the partial updates.
    assert_eq!(stored.name, event.name);
    assert_eq!(stored.capacity, event.capacity);
}

#[tokio::test]
async fn waiting_list_round_trips_and_clears() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = EventRepository::new(test.db());
    let event = create_event(test.db()).await.unwrap();

    assert!(repo.get_waiting(event.id).await.unwrap().is_empty());

    repo.set_waiting(event.id, vec!["u1".into(), "u2".into()]).await.unwrap();
    assert_eq!(repo.get_waiting(event.id).await.unwrap(), vec!["u1", "u2"]);

    repo.set_waiting(event.id, Vec::new()).await.unwrap();
    let stored = repo.get(event.id).await.unwrap().unwrap();
    assert!(stored.waiting.is_none());
}

#[tokio::test]
async fn delete_removes_the_event_and_its_confirms() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = EventRepository::new(test.db());
    let event = create_event(test.db()).await.unwrap();
    create_confirm(test.db(), event.id, "u1", true).await.unwrap();

    repo.delete(event.id).await.unwrap();

    assert!(repo.get(event.id).await.unwrap().is_none());
    let confirms = ConfirmRepository::new(test.db())
        .get_by_event(event.id)
        .await
        .unwrap();
    assert!(confirms.is_empty());
}

#[tokio::test]
async fn instant_events_store_no_time() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let event = EventFactory::new(test.db()).instant(true).build().await.unwrap();

    assert!(event.instant);
    assert!(event.time.is_none());
}
