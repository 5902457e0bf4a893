use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type TrackId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Chill,
    Energetic,
    Heartbreak,
    Focus,
    Party,
    Dreamy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Self::Chill,
        Self::Energetic,
        Self::Heartbreak,
        Self::Focus,
        Self::Party,
        Self::Dreamy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chill => "chill",
            Self::Energetic => "energetic",
            Self::Heartbreak => "heartbreak",
            Self::Focus => "focus",
            Self::Party => "party",
            Self::Dreamy => "dreamy",
        }
    }

    pub fn info(self) -> MoodInfo {
        match self {
            Self::Chill => MoodInfo {
                title: "Chill Vibes",
                description: "Relax and unwind with smooth vibes",
                color: "#14B8A6",
            },
            Self::Energetic => MoodInfo {
                title: "Energetic Bangers",
                description: "Pump up the energy and move",
                color: "#F59E0B",
            },
            Self::Heartbreak => MoodInfo {
                title: "Heartbreak Hotel",
                description: "Feel the emotion, heal with sound",
                color: "#EC4899",
            },
            Self::Focus => MoodInfo {
                title: "Deep Focus",
                description: "Get in the zone and concentrate",
                color: "#8B5CF6",
            },
            Self::Party => MoodInfo {
                title: "Party Anthems",
                description: "Turn up and celebrate life",
                color: "#EF4444",
            },
            Self::Dreamy => MoodInfo {
                title: "Dreamy Escape",
                description: "Float away on ethereal sounds",
                color: "#6366F1",
            },
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("unknown mood {wanted}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub mood: Mood,
    #[serde(rename = "emoji", alias = "displayIcon")]
    pub icon: String,
    pub duration: String,
}

impl Track {
    pub fn duration_seconds(&self) -> u32 {
        crate::duration::parse_duration(&self.duration).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriteria {
    #[default]
    Title,
    Artist,
    Mood,
}

impl SortCriteria {
    pub fn field(self, track: &Track) -> &str {
        match self {
            Self::Title => &track.title,
            Self::Artist => &track.artist,
            Self::Mood => track.mood.as_str(),
        }
    }
}

impl FromStr for SortCriteria {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "artist" => Ok(Self::Artist),
            "mood" => Ok(Self::Mood),
            other => anyhow::bail!("unknown sort criteria {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistStats {
    pub count: usize,
    pub total_duration: String,
    pub mood_breakdown: BTreeMap<Mood, usize>,
}
