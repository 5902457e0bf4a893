use crate::duration;
use crate::model::{Mood, PlaylistStats, SortCriteria, Track, TrackId};
use crate::storage::Storage;
use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const PLAYLIST_KEY: &str = "userPlaylist";

#[derive(Clone)]
pub struct PlaylistStore {
    storage: Arc<dyn Storage>,
}

impl PlaylistStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn get_all(&self) -> Vec<Track> {
        match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("treating playlist as empty: {err:#}");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.get_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get_all().is_empty()
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.get_all().iter().any(|entry| entry.id == id)
    }

    pub fn add(&self, track: &Track) -> bool {
        let mut entries = self.get_all();
        if entries.iter().any(|entry| entry.id == track.id) {
            return false;
        }
        entries.push(track.clone());
        self.persist(&entries, "add")
    }

    pub fn remove(&self, id: TrackId) {
        let mut entries = self.get_all();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() != before {
            self.persist(&entries, "remove");
        }
    }

    pub fn toggle(&self, track: &Track) -> bool {
        if self.contains(track.id) {
            self.remove(track.id);
            self.contains(track.id)
        } else {
            self.add(track)
        }
    }

    pub fn clear(&self) {
        match self.storage.remove(PLAYLIST_KEY) {
            Ok(()) => log::debug!("playlist cleared"),
            Err(err) => log::error!("failed to clear playlist: {err:#}"),
        }
    }

    pub fn stats(&self) -> PlaylistStats {
        let entries = self.get_all();
        let total_seconds: u64 = entries
            .iter()
            .map(|entry| u64::from(entry.duration_seconds()))
            .sum();
        let mut mood_breakdown = BTreeMap::new();
        for entry in &entries {
            *mood_breakdown.entry(entry.mood).or_insert(0) += 1;
        }
        PlaylistStats {
            count: entries.len(),
            total_duration: duration::format_total(total_seconds),
            mood_breakdown,
        }
    }

    pub fn sorted_by(&self, criteria: SortCriteria) -> Vec<Track> {
        let mut entries = self.get_all();
        entries.sort_by(|a, b| compare_fields(criteria.field(a), criteria.field(b)));
        entries
    }

    pub fn by_mood(&self, mood: Mood) -> Vec<Track> {
        self.get_all()
            .into_iter()
            .filter(|entry| entry.mood == mood)
            .collect()
    }

    pub fn shuffled(&self, rng: &mut SmallRng) -> Vec<Track> {
        let mut entries = self.get_all();
        entries.shuffle(rng);
        entries
    }

    pub fn recently_added(&self, limit: usize) -> Vec<Track> {
        let entries = self.get_all();
        let start = entries.len().saturating_sub(limit);
        entries[start..].iter().rev().cloned().collect()
    }

    pub fn export_as_text(&self) -> String {
        let entries = self.get_all();
        match serde_json::to_string_pretty(&entries) {
            Ok(text) => text,
            Err(err) => {
                log::error!("failed to serialise playlist: {err}");
                String::from("[]")
            }
        }
    }

    /// Malformed input leaves the stored playlist untouched.
    pub fn import_from_text(&self, text: &str) -> bool {
        let parsed: Vec<Track> = match serde_json::from_str(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("rejected playlist import: {err}");
                return false;
            }
        };

        let mut seen = HashSet::with_capacity(parsed.len());
        let entries: Vec<Track> = parsed
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .collect();
        self.persist(&entries, "import")
    }

    fn load(&self) -> Result<Vec<Track>> {
        let Some(raw) = self.storage.read(PLAYLIST_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("failed to parse stored playlist")
    }

    fn persist(&self, entries: &[Track], operation: &str) -> bool {
        let written = serde_json::to_string(entries)
            .context("failed to serialise playlist")
            .and_then(|json| self.storage.write(PLAYLIST_KEY, &json));
        match written {
            Ok(()) => {
                log::debug!("playlist {operation}: {} entries", entries.len());
                true
            }
            Err(err) => {
                log::error!("playlist {operation} not saved: {err:#}");
                false
            }
        }
    }
}

fn collation_key(value: &str) -> String {
    value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_fields(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;
    use rand::SeedableRng;

    fn store() -> PlaylistStore {
        PlaylistStore::new(Arc::new(MemoryStorage::new()))
    }

    fn track(id: TrackId, title: &str, artist: &str, mood: Mood, duration: &str) -> Track {
        Track {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            mood,
            icon: String::from("*"),
            duration: duration.to_string(),
        }
    }

    #[test]
    fn add_is_keyed_by_id() {
        let store = store();
        let catalog = Catalog::builtin();
        let song = catalog.by_id(3).expect("track").clone();

        assert!(store.add(&song));
        assert!(store.contains(3));
        assert!(!store.add(&song));
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn remove_absent_id_is_a_no_op() {
        let store = store();
        store.add(&track(1, "a", "x", Mood::Chill, "1:00"));
        store.add(&track(2, "b", "y", Mood::Party, "2:00"));

        store.remove(9);
        assert_eq!(store.len(), 2);

        store.remove(1);
        assert!(!store.contains(1));
        assert_eq!(store.get_all()[0].id, 2);
    }

    #[test]
    fn toggle_flips_membership() {
        let store = store();
        let song = track(5, "Rainy Day", "Calm Collective", Mood::Chill, "3:52");
        assert!(store.toggle(&song));
        assert!(store.contains(5));
        assert!(!store.toggle(&song));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_playlist() {
        let store = store();
        store.add(&track(1, "a", "x", Mood::Chill, "1:00"));
        store.clear();
        assert!(store.get_all().is_empty());
        assert_eq!(store.stats().count, 0);
    }

    #[test]
    fn stats_for_single_track() {
        let store = store();
        store.add(&track(1, "Sunset Dreams", "Lo-Fi Beats", Mood::Chill, "3:45"));

        let stats = store.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total_duration, "3m");
        assert_eq!(stats.mood_breakdown, BTreeMap::from([(Mood::Chill, 1)]));
    }

    #[test]
    fn stats_include_hours_and_skip_bad_durations() {
        let store = store();
        store.add(&track(1, "a", "x", Mood::Focus, "40:00"));
        store.add(&track(2, "b", "y", Mood::Focus, "25:30"));
        store.add(&track(3, "c", "z", Mood::Party, "oops"));

        let stats = store.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_duration, "1h 5m");
        assert_eq!(stats.mood_breakdown.get(&Mood::Focus), Some(&2));
        assert_eq!(stats.mood_breakdown.get(&Mood::Party), Some(&1));
        assert_eq!(stats.mood_breakdown.get(&Mood::Chill), None);
    }

    #[test]
    fn stats_total_survives_durations_past_u32_seconds() {
        let store = store();
        let raw = r#"[
            {"id":1,"title":"long","artist":"x","mood":"focus","emoji":"*","duration":"71582788:15"},
            {"id":2,"title":"short","artist":"y","mood":"chill","emoji":"*","duration":"0:01"}
        ]"#;
        assert!(store.import_from_text(raw));

        let stats = store.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_duration, "1193046h 28m");
    }

    #[test]
    fn sorting_leaves_stored_order() {
        let store = store();
        store.add(&track(1, "zulu", "Émile", Mood::Party, "1:00"));
        store.add(&track(2, "Alpha", "bravo", Mood::Chill, "1:00"));
        store.add(&track(3, "mike", "Echo", Mood::Dreamy, "1:00"));

        let by_title: Vec<TrackId> = store
            .sorted_by(SortCriteria::Title)
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(by_title, vec![2, 3, 1]);

        let by_artist: Vec<TrackId> = store
            .sorted_by(SortCriteria::Artist)
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(by_artist, vec![2, 3, 1]);

        let by_mood: Vec<TrackId> = store
            .sorted_by(SortCriteria::Mood)
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(by_mood, vec![2, 3, 1]);

        let stored: Vec<TrackId> = store.get_all().iter().map(|entry| entry.id).collect();
        assert_eq!(stored, vec![1, 2, 3]);
    }

    #[test]
    fn recently_added_is_newest_first() {
        let store = store();
        for id in 1..=4 {
            store.add(&track(id, "t", "a", Mood::Chill, "1:00"));
        }
        let recent: Vec<TrackId> = store.recently_added(2).iter().map(|entry| entry.id).collect();
        assert_eq!(recent, vec![4, 3]);
        assert_eq!(store.recently_added(10).len(), 4);
    }

    #[test]
    fn shuffled_keeps_the_same_entries() {
        let store = store();
        for id in 1..=8 {
            store.add(&track(id, "t", "a", Mood::Chill, "1:00"));
        }
        let mut rng = SmallRng::seed_from_u64(11);
        let mut shuffled: Vec<TrackId> = store.shuffled(&mut rng).iter().map(|entry| entry.id).collect();
        shuffled.sort_unstable();
        assert_eq!(shuffled, (1..=8).collect::<Vec<_>>());

        let stored: Vec<TrackId> = store.get_all().iter().map(|entry| entry.id).collect();
        assert_eq!(stored, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn by_mood_filters_in_stored_order() {
        let store = store();
        store.add(&track(4, "d", "a", Mood::Focus, "1:00"));
        store.add(&track(2, "b", "a", Mood::Chill, "1:00"));
        store.add(&track(1, "a", "a", Mood::Focus, "1:00"));
        let focus: Vec<TrackId> = store.by_mood(Mood::Focus).iter().map(|entry| entry.id).collect();
        assert_eq!(focus, vec![4, 1]);
    }

    #[test]
    fn export_then_import_keeps_content_and_order() {
        let store = store();
        store.add(&track(9, "Ethereal", "Dream Pop", Mood::Dreamy, "4:15"));
        store.add(&track(1, "Sunset Dreams", "Lo-Fi Beats", Mood::Chill, "3:45"));
        let before = store.get_all();

        let exported = store.export_as_text();
        assert!(exported.contains('\n'));
        store.clear();
        assert!(store.import_from_text(&exported));
        assert_eq!(store.get_all(), before);
    }

    #[test]
    fn malformed_import_leaves_playlist_untouched() {
        let store = store();
        store.add(&track(1, "a", "x", Mood::Chill, "1:00"));

        assert!(!store.import_from_text("not json"));
        assert!(!store.import_from_text(r#"{"id": 1}"#));
        assert!(!store.import_from_text(r#"[{"id": 2, "title": "missing fields"}]"#));
        assert_eq!(store.get_all().len(), 1);
        assert!(store.contains(1));
    }

    #[test]
    fn import_drops_repeated_ids() {
        let store = store();
        let raw = r#"[
            {"id":1,"title":"first","artist":"x","mood":"chill","emoji":"*","duration":"1:00"},
            {"id":1,"title":"second","artist":"y","mood":"party","emoji":"*","duration":"2:00"},
            {"id":2,"title":"third","artist":"z","mood":"focus","emoji":"*","duration":"3:00"}
        ]"#;
        assert!(store.import_from_text(raw));
        let entries = store.get_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "first");
    }

    #[test]
    fn corrupt_record_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(PLAYLIST_KEY, "{broken").expect("write");
        let store = PlaylistStore::new(storage);

        assert!(store.get_all().is_empty());
        assert!(!store.contains(1));
        assert!(store.add(&track(1, "a", "x", Mood::Chill, "1:00")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn collation_ignores_case_and_accents() {
        assert_eq!(compare_fields("émile", "Emile"), Ordering::Greater);
        assert_eq!(collation_key("Émile"), "emile");
        assert_eq!(compare_fields("apple", "Banana"), Ordering::Less);
    }

    proptest::proptest! {
        #[test]
        fn membership_tracks_adds_and_removes(
            ops in proptest::collection::vec((proptest::bool::ANY, 1u32..12), 1..120)
        ) {
            let store = store();
            let mut expected: Vec<TrackId> = Vec::new();
            for (is_add, id) in ops {
                if is_add {
                    let added = store.add(&track(id, "t", "a", Mood::Chill, "1:00"));
                    proptest::prop_assert_eq!(added, !expected.contains(&id));
                    if added {
                        expected.push(id);
                    }
                    proptest::prop_assert!(store.contains(id));
                } else {
                    store.remove(id);
                    expected.retain(|entry| *entry != id);
                    proptest::prop_assert!(!store.contains(id));
                }
            }

            let stored: Vec<TrackId> = store.get_all().iter().map(|entry| entry.id).collect();
            proptest::prop_assert_eq!(&stored, &expected);
            let unique: HashSet<TrackId> = stored.iter().copied().collect();
            proptest::prop_assert_eq!(unique.len(), stored.len());
        }

        #[test]
        fn export_import_restores_any_playlist(ids in proptest::collection::vec(0u32..1000, 0..40)) {
            let source = store();
            for id in &ids {
                source.add(&track(*id, &format!("title {id}"), "artist", Mood::Dreamy, "2:30"));
            }

            let target = store();
            target.add(&track(5000, "stale", "artist", Mood::Party, "1:00"));
            proptest::prop_assert!(target.import_from_text(&source.export_as_text()));
            proptest::prop_assert_eq!(target.get_all(), source.get_all());
        }
    }
}
