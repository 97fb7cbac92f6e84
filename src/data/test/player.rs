use test_utils::builder::TestBuilder;
use test_utils::factory::player::{create_player, create_unlinked_player, PlayerFactory};

use crate::data::PlayerRepository;

#[tokio::test]
async fn upsert_link_creates_a_missing_player() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = PlayerRepository::new(test.db());

    let player = repo.upsert_link("discord_new", "76561198000000042").await.unwrap();

    assert_eq!(player.discord_id, "discord_new");
    assert_eq!(player.steam_id.as_deref(), Some("76561198000000042"));
}

#[tokio::test]
async fn upsert_link_relinks_an_existing_player() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = PlayerRepository::new(test.db());
    let existing = create_unlinked_player(test.db()).await.unwrap();

    let updated = repo
        .upsert_link(&existing.discord_id, "76561198000000099")
        .await
        .unwrap();

    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.steam_id.as_deref(), Some("76561198000000099"));
}

#[tokio::test]
async fn get_all_linked_skips_unlinked_players() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = PlayerRepository::new(test.db());

    let linked = create_player(test.db()).await.unwrap();
    create_unlinked_player(test.db()).await.unwrap();

    let players = repo.get_all_linked().await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id, linked.id);
}

#[tokio::test]
async fn set_mmr_updates_only_the_rating() {
    let test = TestBuilder::new().with_event_tables().build().await.unwrap();
    let repo = PlayerRepository::new(test.db());
    let player = PlayerFactory::new(test.db()).solo_mmr(Some(3000)).build().await.unwrap();

    repo.set_mmr(player.id, Some(4200)).await.unwrap();

    let stored = repo.find_by_discord(&player.discord_id).await.unwrap().unwrap();
    assert_eq!(stored.solo_mmr, Some(4200));
    assert_eq!(stored.steam_id, player.steam_id);
}
