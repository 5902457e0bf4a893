use crate::model::TrackId;
use crate::storage::Storage;
use anyhow::Result;

pub const CURRENT_TRACK_KEY: &str = "currentSongId";

pub fn request_playback(storage: &dyn Storage, id: TrackId) -> Result<()> {
    storage.write(CURRENT_TRACK_KEY, &id.to_string())?;
    log::debug!("requested playback of track {id}");
    Ok(())
}

pub fn requested_track(storage: &dyn Storage) -> Option<TrackId> {
    let raw = match storage.read(CURRENT_TRACK_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            log::warn!("ignoring now playing record: {err:#}");
            return None;
        }
    };
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("ignoring malformed now playing record {raw:?}");
    }
    parsed
}
