use crate::catalog::Catalog;
use crate::model::{Track, TrackId};
use crate::playlist::PlaylistStore;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::session;
use crate::storage::Storage;
use std::sync::Arc;
use std::time::Duration;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_VOLUME: u8 = 70;
const MAX_VOLUME: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Progress { elapsed: u32, total: u32 },
    TrackChanged { index: usize, track_id: TrackId },
}

pub fn resolve_source_list(playlist: &[Track], catalog: &[Track]) -> Vec<Track> {
    if playlist.is_empty() {
        catalog.to_vec()
    } else {
        playlist.to_vec()
    }
}

pub fn resolve_index(source: &[Track], requested: Option<TrackId>) -> usize {
    requested
        .and_then(|id| source.iter().position(|track| track.id == id))
        .unwrap_or(0)
}

pub struct Player<S: Scheduler> {
    catalog: Arc<Catalog>,
    scheduler: S,
    source: Vec<Track>,
    current_index: usize,
    elapsed_seconds: u32,
    total_seconds: u32,
    is_playing: bool,
    volume: u8,
    timer: Option<TimerHandle>,
}

impl<S: Scheduler> Player<S> {
    pub fn new(catalog: Arc<Catalog>, scheduler: S) -> Self {
        Self {
            catalog,
            scheduler,
            source: Vec::new(),
            current_index: 0,
            elapsed_seconds: 0,
            total_seconds: 0,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            timer: None,
        }
    }

    pub fn load_from_store(&mut self, store: &PlaylistStore, storage: &dyn Storage) {
        let requested = session::requested_track(storage);
        self.load_track(&store.get_all(), requested);
    }

    pub fn load_track(&mut self, playlist: &[Track], requested: Option<TrackId>) {
        self.disarm();
        self.is_playing = false;
        self.source = resolve_source_list(playlist, self.catalog.all());
        self.current_index = resolve_index(&self.source, requested);
        self.reset_position();
        if self.source.is_empty() {
            log::warn!("nothing to play: playlist and catalogue are both empty");
        } else {
            log::debug!(
                "loaded track {} of {} ({}s)",
                self.current_index + 1,
                self.source.len(),
                self.total_seconds
            );
        }
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if self.is_playing || self.source.is_empty() {
            return;
        }
        self.arm();
        self.is_playing = true;
        log::debug!("playing");
    }

    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.disarm();
        self.is_playing = false;
        log::debug!("paused at {}s", self.elapsed_seconds);
    }

    /// Reaching the end of the track moves on to the next one.
    pub fn tick(&mut self) -> Option<PlayerEvent> {
        if self.source.is_empty() {
            return None;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        if self.elapsed_seconds >= self.total_seconds {
            self.next();
            return self.track_changed();
        }
        Some(PlayerEvent::Progress {
            elapsed: self.elapsed_seconds,
            total: self.total_seconds,
        })
    }

    pub fn pump(&mut self) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Some(handle) = self.timer {
            if !self.is_playing || !self.scheduler.take_due(handle) {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    pub fn seek(&mut self, target_seconds: i64) {
        self.elapsed_seconds = target_seconds.clamp(0, i64::from(self.total_seconds)) as u32;
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let target = (f64::from(self.total_seconds) * fraction).floor();
        self.seek(target as i64);
    }

    pub fn next(&mut self) {
        if self.source.is_empty() {
            return;
        }
        self.current_index = (self.current_index + 1) % self.source.len();
        self.reload_current();
    }

    pub fn previous(&mut self) {
        if self.source.is_empty() {
            return;
        }
        self.current_index = self
            .current_index
            .checked_sub(1)
            .unwrap_or(self.source.len() - 1);
        self.reload_current();
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(MAX_VOLUME);
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.source.get(self.current_index)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_seconds) / f64::from(self.total_seconds) * 100.0
    }

    pub fn source(&self) -> &[Track] {
        &self.source
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn reload_current(&mut self) {
        self.reset_position();
        if self.is_playing {
            self.disarm();
            self.arm();
        }
        if let Some(track) = self.current_track() {
            log::debug!("now at track {} ({})", track.id, track.title);
        }
    }

    fn reset_position(&mut self) {
        self.elapsed_seconds = 0;
        self.total_seconds = self
            .current_track()
            .map(Track::duration_seconds)
            .unwrap_or(0);
    }

    fn track_changed(&self) -> Option<PlayerEvent> {
        self.current_track().map(|track| PlayerEvent::TrackChanged {
            index: self.current_index,
            track_id: track.id,
        })
    }

    fn arm(&mut self) {
        self.disarm();
        self.timer = Some(self.scheduler.schedule(TICK_INTERVAL));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}
