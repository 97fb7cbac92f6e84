use test_utils::builder::TestBuilder;
use test_utils::factory::confirm::{create_confirm, fill_event};
use test_utils::factory::event::{create_event, EventFactory};

use crate::data::{ConfirmRepository, EventRepository};

#[tokio::test]
async fn replace_overwrites_a_previous_answer() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let event = create_event(test.db()).await.unwrap();
    let repo = ConfirmRepository::new(test.db());

    repo.replace(event.id, "u1", true).await.unwrap();
    repo.replace(event.id, "u1", false).await.unwrap();

    let confirms = repo.get_by_event(event.id).await.unwrap();
    assert_eq!(confirms.len(), 1);
    assert!(!confirms[0].attends);
}

#[tokio::test]
async fn count_attending_ignores_declines() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let event = create_event(test.db()).await.unwrap();
    let repo = ConfirmRepository::new(test.db());

    fill_event(test.db(), event.id, 3).await.unwrap();
    create_confirm(test.db(), event.id, "decliner", false).await.unwrap();

    assert_eq!(repo.count_attending(event.id).await.unwrap(), 3);
}

#[tokio::test]
async fn replace_drops_the_user_from_the_waiting_list() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let event = EventFactory::new(test.db())
        .waiting(Some(serde_json::json!(["u1", "u2"])))
        .build()
        .await
        .unwrap();

    ConfirmRepository::new(test.db())
        .replace(event.id, "u1", true)
        .await
        .unwrap();

    let waiting = EventRepository::new(test.db())
        .get_waiting(event.id)
        .await
        .unwrap();
    assert_eq!(waiting, vec!["u2"]);
}

#[tokio::test]
async fn answers_are_scoped_per_event() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let first = create_event(test.db()).await.unwrap();
    let second = create_event(test.db()).await.unwrap();
    let repo = ConfirmRepository::new(test.db());

    repo.replace(first.id, "u1", true).await.unwrap();
    repo.replace(second.id, "u1", false).await.unwrap();

    assert_eq!(repo.count_attending(first.id).await.unwrap(), 1);
    assert_eq!(repo.count_attending(second.id).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_one_leaves_other_users_untouched() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let event = create_event(test.db()).await.unwrap();
    let repo = ConfirmRepository::new(test.db());

    repo.replace(event.id, "u1", true).await.unwrap();
    repo.replace(event.id, "u2", true).await.unwrap();

    repo.delete_one(event.id, "u1").await.unwrap();

    let confirms = repo.get_by_event(event.id).await.unwrap();
    assert_eq!(confirms.len(), 1);
    assert_eq!(confirms[0].user_id, "u2");
}
