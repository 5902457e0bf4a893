use crate::catalog::Catalog;
use crate::config::{self, Settings};
use crate::duration::format_duration;
use crate::model::{Mood, SortCriteria, Track, TrackId};
use crate::player::{Player, PlayerEvent};
use crate::playlist::PlaylistStore;
use crate::scheduler::{IntervalScheduler, ManualScheduler, Scheduler};
use crate::session;
use crate::storage::{FileStorage, Storage};
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const DEFAULT_PLAY_SECONDS: u32 = 5;
const WALL_CLOCK_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Moods,
    Browse {
        mood: Option<Mood>,
        search: String,
    },
    Random(Option<usize>),
    List {
        sort: Option<SortCriteria>,
        mood: Option<Mood>,
    },
    Add(TrackId),
    Remove(TrackId),
    Toggle(TrackId),
    Clear,
    Stats,
    Recent(Option<usize>),
    Shuffle,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Play {
        id: Option<TrackId>,
        seconds: u32,
    },
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Self::Help);
        };

        let command = match name.as_str() {
            "moods" => {
                expect_no_more(rest)?;
                Self::Moods
            }
            "browse" => {
                let mut mood: Option<Mood> = None;
                let mut search = String::new();
                let mut index = 0;
                while index < rest.len() {
                    match rest[index].as_str() {
                        "--mood" => {
                            mood = Some(flag_value(rest, &mut index, "--mood")?.parse::<Mood>()?)
                        }
                        "--search" => {
                            search = flag_value(rest, &mut index, "--search")?.to_string()
                        }
                        other => anyhow::bail!("unknown argument {other}"),
                    }
                    index += 1;
                }
                Self::Browse { mood, search }
            }
            "random" => Self::Random(optional_number(rest)?),
            "list" => {
                let mut sort: Option<SortCriteria> = None;
                let mut mood: Option<Mood> = None;
                let mut index = 0;
                while index < rest.len() {
                    match rest[index].as_str() {
                        "--sort" => {
                            sort = Some(flag_value(rest, &mut index, "--sort")?.parse::<SortCriteria>()?)
                        }
                        "--mood" => {
                            mood = Some(flag_value(rest, &mut index, "--mood")?.parse::<Mood>()?)
                        }
                        other => anyhow::bail!("unknown argument {other}"),
                    }
                    index += 1;
                }
                Self::List { sort, mood }
            }
            "add" => Self::Add(required_id(rest)?),
            "remove" => Self::Remove(required_id(rest)?),
            "toggle" => Self::Toggle(required_id(rest)?),
            "clear" => {
                expect_no_more(rest)?;
                Self::Clear
            }
            "stats" => {
                expect_no_more(rest)?;
                Self::Stats
            }
            "recent" => Self::Recent(optional_number(rest)?),
            "shuffle" => {
                expect_no_more(rest)?;
                Self::Shuffle
            }
            "export" => match rest {
                [] => Self::Export(None),
                [path] => Self::Export(Some(PathBuf::from(path))),
                _ => anyhow::bail!("export takes at most one file"),
            },
            "import" => match rest {
                [path] => Self::Import(PathBuf::from(path)),
                _ => anyhow::bail!("import requires exactly one file"),
            },
            "play" => {
                let mut id = None;
                let mut seconds = DEFAULT_PLAY_SECONDS;
                let mut index = 0;
                while index < rest.len() {
                    match rest[index].as_str() {
                        "--seconds" => {
                            let value = flag_value(rest, &mut index, "--seconds")?;
                            seconds = value
                                .parse::<u32>()
                                .with_context(|| format!("invalid seconds {value}"))?;
                        }
                        value if id.is_none() => id = Some(parse_id(value)?),
                        other => anyhow::bail!("unknown argument {other}"),
                    }
                    index += 1;
                }
                Self::Play { id, seconds }
            }
            "help" | "-h" | "--help" => Self::Help,
            other => anyhow::bail!("unknown command {other}"),
        };
        Ok(command)
    }
}

pub struct App {
    catalog: Arc<Catalog>,
    storage: Arc<dyn Storage>,
    store: PlaylistStore,
    settings: Settings,
}

impl App {
    pub fn new(catalog: Arc<Catalog>, storage: Arc<dyn Storage>, settings: Settings) -> Self {
        let store = PlaylistStore::new(Arc::clone(&storage));
        Self {
            catalog,
            storage,
            store,
            settings,
        }
    }

    pub fn open(settings: Settings) -> Result<Self> {
        let root = config::ensure_data_dir()?;
        let storage = FileStorage::open(&root)?;
        let catalog = match &settings.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        if catalog.is_empty() {
            log::warn!("catalogue is empty; the player will have nothing to fall back on");
        }
        Ok(Self::new(Arc::new(catalog), Arc::new(storage), settings))
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn execute(&self, command: Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::Moods => {
                for summary in self.catalog.moods() {
                    writeln!(
                        out,
                        "{:<11} {} {} - {} ({} tracks)",
                        summary.mood.as_str(),
                        summary.info.color,
                        summary.info.title,
                        summary.info.description,
                        summary.track_count
                    )?;
                }
            }
            Command::Browse { mood, search } => {
                let tracks = self.catalog.filter(&search, mood);
                if tracks.is_empty() {
                    writeln!(out, "No songs found")?;
                }
                for track in &tracks {
                    let marker = if self.store.contains(track.id) { "+" } else { " " };
                    writeln!(out, "{marker} {}", track_line(track))?;
                }
            }
            Command::Random(count) => {
                let mut rng = SmallRng::from_rng(&mut rand::rng());
                let count = count.unwrap_or(self.settings.discover_count);
                write_tracks(out, &self.catalog.random(count, &mut rng))?;
            }
            Command::List { sort, mood } => {
                let tracks = match (sort, mood) {
                    (None, None) => self.store.get_all(),
                    (None, Some(mood)) => self.store.by_mood(mood),
                    (Some(criteria), mood) => {
                        let mut sorted = self.store.sorted_by(criteria);
                        if let Some(mood) = mood {
                            sorted.retain(|track| track.mood == mood);
                        }
                        sorted
                    }
                };
                if tracks.is_empty() {
                    writeln!(out, "Your playlist is empty")?;
                }
                write_tracks(out, &tracks)?;
            }
            Command::Add(id) => {
                let track = self.catalog_track(id)?;
                if self.store.add(track) {
                    writeln!(out, "Added to playlist: {}", track.title)?;
                } else {
                    writeln!(out, "Already in playlist: {}", track.title)?;
                }
            }
            Command::Remove(id) => {
                self.store.remove(id);
                writeln!(out, "Removed from playlist")?;
            }
            Command::Toggle(id) => {
                let track = self.catalog_track(id)?;
                if self.store.toggle(track) {
                    writeln!(out, "Added to playlist: {}", track.title)?;
                } else {
                    writeln!(out, "Removed from playlist: {}", track.title)?;
                }
            }
            Command::Clear => {
                self.store.clear();
                writeln!(out, "Playlist cleared")?;
            }
            Command::Stats => {
                let stats = self.store.stats();
                writeln!(out, "{} tracks, {}", stats.count, stats.total_duration)?;
                for (mood, count) in &stats.mood_breakdown {
                    writeln!(out, "  {mood}: {count}")?;
                }
            }
            Command::Recent(limit) => {
                let limit = limit.unwrap_or(self.settings.recent_limit);
                write_tracks(out, &self.store.recently_added(limit))?;
            }
            Command::Shuffle => {
                let mut rng = SmallRng::from_rng(&mut rand::rng());
                write_tracks(out, &self.store.shuffled(&mut rng))?;
            }
            Command::Export(path) => {
                let text = self.store.export_as_text();
                match path {
                    Some(path) => {
                        fs::write(&path, text)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        writeln!(out, "Exported playlist to {}", path.display())?;
                    }
                    None => writeln!(out, "{text}")?,
                }
            }
            Command::Import(path) => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                if !self.store.import_from_text(&text) {
                    anyhow::bail!("{} is not a valid playlist export", path.display());
                }
                writeln!(out, "Imported {} tracks", self.store.len())?;
            }
            Command::Play { id, seconds } => {
                self.play(IntervalScheduler::new(), id, seconds, out, |_| {
                    thread::sleep(WALL_CLOCK_POLL)
                })?;
            }
            Command::Help => write_help(out)?,
        }
        Ok(())
    }

    pub fn play_simulated(&self, id: Option<TrackId>, seconds: u32, out: &mut dyn Write) -> Result<()> {
        self.play(ManualScheduler::new(), id, seconds, out, |scheduler| {
            scheduler.advance(Duration::from_secs(1))
        })
    }

    fn play<S: Scheduler>(
        &self,
        scheduler: S,
        id: Option<TrackId>,
        seconds: u32,
        out: &mut dyn Write,
        mut wait: impl FnMut(&mut S),
    ) -> Result<()> {
        if let Some(id) = id {
            session::request_playback(self.storage.as_ref(), id)?;
        }

        let mut player = Player::new(Arc::clone(&self.catalog), scheduler);
        player.set_volume(self.settings.volume);
        player.load_from_store(&self.store, self.storage.as_ref());
        let Some(track) = player.current_track() else {
            writeln!(out, "Nothing to play")?;
            return Ok(());
        };
        writeln!(out, "Now playing: {}", track_line(track))?;

        player.play();
        let mut played = 0;
        while played < seconds {
            wait(player.scheduler_mut());
            for event in player.pump() {
                played += 1;
                match event {
                    PlayerEvent::Progress { elapsed, total } => writeln!(
                        out,
                        "  {} / {}",
                        format_duration(elapsed),
                        format_duration(total)
                    )?,
                    PlayerEvent::TrackChanged { .. } => {
                        if let Some(track) = player.current_track() {
                            writeln!(out, "Now playing: {}", track_line(track))?;
                        }
                    }
                }
            }
        }
        player.pause();
        Ok(())
    }

    fn catalog_track(&self, id: TrackId) -> Result<&Track> {
        self.catalog
            .by_id(id)
            .with_context(|| format!("no track with id {id}"))
    }
}

pub fn run(args: Vec<String>) -> Result<()> {
    let command = Command::parse(&args)?;
    let settings = config::load_settings()?;
    let app = App::open(settings)?;
    let mut stdout = std::io::stdout();
    app.execute(command, &mut stdout)
}

fn track_line(track: &Track) -> String {
    format!(
        "{:>3}  {} {} - {} ({}, {})",
        track.id, track.icon, track.title, track.artist, track.mood, track.duration
    )
}

fn write_tracks(out: &mut dyn Write, tracks: &[Track]) -> Result<()> {
    for track in tracks {
        writeln!(out, "{}", track_line(track))?;
    }
    Ok(())
}

fn write_help(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "TuneVibes")?;
    writeln!(out, "  moods                              List moods")?;
    writeln!(out, "  browse [--mood M] [--search Q]     Browse the catalogue")?;
    writeln!(out, "  random [N]                         Pick random tracks")?;
    writeln!(out, "  list [--sort title|artist|mood] [--mood M]")?;
    writeln!(out, "  add ID | remove ID | toggle ID     Edit the playlist")?;
    writeln!(out, "  clear | stats | shuffle | recent [N]")?;
    writeln!(out, "  export [FILE] | import FILE")?;
    writeln!(out, "  play [ID] [--seconds N]            Simulate playback")?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str> {
    *index += 1;
    let Some(value) = args.get(*index) else {
        anyhow::bail!("{flag} requires a value");
    };
    if value.trim().is_empty() {
        anyhow::bail!("{flag} cannot be empty");
    }
    Ok(value.trim())
}

fn parse_id(value: &str) -> Result<TrackId> {
    value
        .trim()
        .parse::<TrackId>()
        .with_context(|| format!("invalid track id {value}"))
}

fn required_id(args: &[String]) -> Result<TrackId> {
    match args {
        [value] => parse_id(value),
        _ => anyhow::bail!("expected exactly one track id"),
    }
}

fn optional_number(args: &[String]) -> Result<Option<usize>> {
    match args {
        [] => Ok(None),
        [value] => Ok(Some(
            value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid count {value}"))?,
        )),
        _ => anyhow::bail!("expected at most one count"),
    }
}

fn expect_no_more(args: &[String]) -> Result<()> {
    match args.first() {
        Some(extra) => anyhow::bail!("unexpected argument {extra}"),
        None => Ok(()),
    }
}
