use crate::model::{Mood, MoodInfo, Track, TrackId};
use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUILTIN_TRACKS: &[(TrackId, &str, &str, Mood, &str, &str)] = &[
    (1, "Sunset Dreams", "Lo-Fi Beats", Mood::Chill, "🌅", "3:45"),
    (2, "Ocean Waves", "Ambient Collective", Mood::Chill, "🌊", "4:12"),
    (3, "Coffee Shop", "Chill Masters", Mood::Chill, "☕", "3:28"),
    (4, "Lazy Sunday", "Relax Radio", Mood::Chill, "🛋️", "4:05"),
    (5, "Rainy Day", "Calm Collective", Mood::Chill, "🌧️", "3:52"),
    (6, "Thunder Strike", "Electric Pulse", Mood::Energetic, "⚡", "3:15"),
    (7, "Adrenaline Rush", "Power Hour", Mood::Energetic, "🔥", "3:38"),
    (8, "Unstoppable", "Momentum", Mood::Energetic, "🚀", "3:22"),
    (9, "Victory Lap", "Champions", Mood::Energetic, "🏆", "3:41"),
    (10, "Beast Mode", "Grind Time", Mood::Energetic, "💪", "3:29"),
    (11, "Ghost of You", "Melancholy Moon", Mood::Heartbreak, "🌙", "4:18"),
    (12, "Empty Spaces", "Sad Girl Hours", Mood::Heartbreak, "💔", "4:32"),
    (13, "Tears in Rain", "Emotional", Mood::Heartbreak, "🌧️", "4:15"),
    (14, "Moving On", "Healing Hearts", Mood::Heartbreak, "🕊️", "3:58"),
    (15, "Fading Memories", "Lost Love", Mood::Heartbreak, "🥀", "4:25"),
    (16, "Flow State", "Productivity Lab", Mood::Focus, "🎯", "5:12"),
    (17, "Study Mode", "Brain Waves", Mood::Focus, "📚", "4:48"),
    (18, "Mind Palace", "Concentration", Mood::Focus, "🧠", "5:05"),
    (19, "Lock In", "Peak Performance", Mood::Focus, "⚙️", "4:52"),
    (20, "Deep Work", "Focus Flow", Mood::Focus, "💻", "5:18"),
    (21, "Turn Up", "DJ Hype", Mood::Party, "🎉", "3:24"),
    (22, "Dance Floor", "Club Kings", Mood::Party, "💃", "3:35"),
    (23, "Weekend Vibes", "Party People", Mood::Party, "🎊", "3:42"),
    (24, "Celebration", "Good Times", Mood::Party, "🥳", "3:28"),
    (25, "Neon Lights", "Club Mix", Mood::Party, "✨", "3:38"),
    (26, "Starlight", "Cosmic Dreams", Mood::Dreamy, "✨", "4:35"),
    (27, "Floating", "Cloud Nine", Mood::Dreamy, "☁️", "4:22"),
    (28, "Moonbeams", "Night Sky", Mood::Dreamy, "🌙", "4:48"),
    (29, "Ethereal", "Dream Pop", Mood::Dreamy, "🦋", "4:15"),
    (30, "Aurora", "Sky Dreamers", Mood::Dreamy, "🌌", "4:52"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodSummary {
    pub mood: Mood,
    pub info: MoodInfo,
    pub track_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(track.id) {
                anyhow::bail!("duplicate track id {} in catalogue", track.id);
            }
        }
        Ok(Self { tracks })
    }

    pub fn builtin() -> Self {
        let tracks = BUILTIN_TRACKS
            .iter()
            .map(|(id, title, artist, mood, icon, duration)| Track {
                id: *id,
                title: (*title).to_string(),
                artist: (*artist).to_string(),
                mood: *mood,
                icon: (*icon).to_string(),
                duration: (*duration).to_string(),
            })
            .collect();
        Self { tracks }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(raw).context("invalid catalogue data")?;
        Self::new(tracks)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalogue {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse catalogue {}", path.display()))
    }

    pub fn all(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn by_id(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn by_mood(&self, mood: Mood) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|track| track.mood == mood)
            .cloned()
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Track> {
        let needle = query.to_lowercase();
        self.tracks
            .iter()
            .filter(|track| {
                track.title.to_lowercase().contains(&needle)
                    || track.artist.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn filter(&self, query: &str, mood: Option<Mood>) -> Vec<Track> {
        let matched = if query.trim().is_empty() {
            self.tracks.clone()
        } else {
            self.search(query)
        };
        match mood {
            Some(mood) => matched
                .into_iter()
                .filter(|track| track.mood == mood)
                .collect(),
            None => matched,
        }
    }

    pub fn random(&self, count: usize, rng: &mut SmallRng) -> Vec<Track> {
        let mut picked = self.tracks.clone();
        picked.shuffle(rng);
        picked.truncate(count);
        picked
    }

    pub fn moods(&self) -> Vec<MoodSummary> {
        Mood::ALL
            .into_iter()
            .map(|mood| MoodSummary {
                mood,
                info: mood.info(),
                track_count: self.tracks.iter().filter(|track| track.mood == mood).count(),
            })
            .collect()
    }
}
