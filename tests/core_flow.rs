use std::sync::Arc;
use std::time::Duration;
use tunevibes::catalog::Catalog;
use tunevibes::model::{Mood, SortCriteria};
use tunevibes::player::{PlaybackState, Player, PlayerEvent};
use tunevibes::playlist::PlaylistStore;
use tunevibes::scheduler::{ManualScheduler, Scheduler};
use tunevibes::session;
use tunevibes::storage::{MemoryStorage, Storage};

#[test]
fn playlist_flow_works() {
    let catalog = Catalog::builtin();
    let store = PlaylistStore::new(Arc::new(MemoryStorage::new()));

    for id in [12, 3, 27] {
        let track = catalog.by_id(id).expect("catalogue track");
        assert!(store.add(track));
    }
    assert!(!store.add(catalog.by_id(3).expect("catalogue track")));

    let titles: Vec<String> = store
        .sorted_by(SortCriteria::Title)
        .into_iter()
        .map(|track| track.title)
        .collect();
    assert_eq!(titles, vec!["Coffee Shop", "Empty Spaces", "Floating"]);

    let stats = store.stats();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.total_duration, "12m");
    assert_eq!(stats.mood_breakdown.get(&Mood::Heartbreak), Some(&1));

    store.remove(12);
    let ids: Vec<u32> = store.get_all().iter().map(|track| track.id).collect();
    assert_eq!(ids, vec![3, 27]);
}

#[test]
fn player_walks_the_playlist_when_it_has_entries() {
    let catalog = Arc::new(Catalog::builtin());
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let store = PlaylistStore::new(Arc::clone(&storage));
    store.add(catalog.by_id(6).expect("track"));
    store.add(catalog.by_id(21).expect("track"));
    session::request_playback(storage.as_ref(), 21).expect("request");

    let mut player = Player::new(Arc::clone(&catalog), ManualScheduler::new());
    player.load_from_store(&store, storage.as_ref());
    assert_eq!(player.current_track().map(|track| track.id), Some(21));

    player.next();
    assert_eq!(player.current_track().map(|track| track.id), Some(6));
    player.previous();
    player.previous();
    assert_eq!(player.current_track().map(|track| track.id), Some(6));
}

#[test]
fn empty_playlist_falls_back_to_catalogue() {
    let catalog = Arc::new(Catalog::builtin());
    let storage = Arc::new(MemoryStorage::new());
    let store = PlaylistStore::new(storage.clone());

    let mut player = Player::new(catalog, ManualScheduler::new());
    player.load_from_store(&store, storage.as_ref());

    assert_eq!(player.state(), PlaybackState::Stopped);
    assert_eq!(player.current_index(), 0);
    assert_eq!(player.source().len(), 30);
    assert_eq!(player.total_seconds(), 225);
}

#[test]
fn a_full_track_plays_through_to_the_next() {
    let catalog = Arc::new(Catalog::builtin());
    let mut player = Player::new(catalog, ManualScheduler::new());
    player.load_track(&[], Some(1));
    player.toggle_play();

    let mut changes = Vec::new();
    for _ in 0..225 {
        player.scheduler_mut().advance(Duration::from_secs(1));
        for event in player.pump() {
            if let PlayerEvent::TrackChanged { track_id, .. } = event {
                changes.push(track_id);
            }
        }
    }

    assert_eq!(changes, vec![2]);
    assert_eq!(player.elapsed_seconds(), 0);
    assert_eq!(player.total_seconds(), 252);
    assert!(player.is_playing());
    assert_eq!(player.scheduler().active_timers(), 1);
}
