#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use std::time::Duration;
use tunevibes::catalog::Catalog;
use tunevibes::player::Player;
use tunevibes::scheduler::{ManualScheduler, Scheduler};

fuzz_target!(|data: &[u8]| {
    let catalog = Arc::new(Catalog::builtin());
    let playlist: Vec<_> = catalog
        .all()
        .iter()
        .take(data.len() % 8)
        .cloned()
        .collect();
    let mut player = Player::new(Arc::clone(&catalog), ManualScheduler::new());
    player.load_track(&playlist, data.first().map(|byte| u32::from(*byte % 32)));

    for byte in data {
        match byte % 8 {
            0 => player.toggle_play(),
            1 => player.next(),
            2 => player.previous(),
            3 => player.seek(i64::from(*byte) * 3 - 200),
            4 => player.seek_fraction(f64::from(*byte) / 128.0),
            5 => {
                player
                    .scheduler_mut()
                    .advance(Duration::from_secs(u64::from(*byte)));
                let _ = player.pump();
            }
            6 => {
                let _ = player.tick();
            }
            _ => player.load_track(&playlist, Some(u32::from(*byte))),
        }

        assert!(player.current_index() < player.source().len());
        assert!(player.elapsed_seconds() <= player.total_seconds());
        assert!(player.scheduler().active_timers() <= 1);
    }
});
