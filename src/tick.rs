//! Foreground tick — periodic snooze-expiry and missed-dose sweeps.
//!
//! Runs on its own thread while the app is foregrounded. The owner
//! starts it when the UI comes up and drops (or shuts down) the handle
//! on background/teardown. Sleeps in small increments so shutdown is
//! responsive.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;

use crate::config;
use crate::db::repository::{get_all_medications, get_profile};
use crate::db::sqlite::open_database;
use crate::engine::{adherence, snooze, EngineError};

/// Sleep granularity for shutdown responsiveness (5 seconds).
const SLEEP_GRANULARITY_SECS: u64 = 5;

/// Handle for the tick thread.
///
/// Supports explicit shutdown via `shutdown()` or automatic cleanup on
/// `Drop`. Store it in the application's foreground lifecycle state.
pub struct TickHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl TickHandle {
    /// Request shutdown. A sweep in flight completes; no new one starts.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the foreground tick on a separate thread. The thread owns its
/// own database connection.
pub fn start_foreground_tick(db_path: PathBuf) -> TickHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            "Foreground tick started (every {}s)",
            config::TICK_INTERVAL_SECS
        );
        tick_loop(&db_path, &flag);
    });

    TickHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn tick_loop(db_path: &std::path::Path, shutdown: &AtomicBool) {
    let conn = match open_database(db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Foreground tick could not open database");
            return;
        }
    };

    while !shutdown.load(Ordering::Relaxed) {
        for _ in 0..(config::TICK_INTERVAL_SECS / SLEEP_GRANULARITY_SECS) {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Foreground tick shutting down");
                return;
            }
            std::thread::sleep(Duration::from_secs(SLEEP_GRANULARITY_SECS));
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        if let Err(e) = run_tick(&conn) {
            tracing::warn!(error = %e, "Tick sweep failed");
        }
    }
    tracing::info!("Foreground tick shutting down");
}

/// One evaluation tick: drop expired snoozes, then backfill missed
/// doses for today's closed windows. Both steps are idempotent, so a
/// tick racing a user edit is harmless. No saved profile means nothing
/// to sweep.
pub fn run_tick(conn: &Connection) -> Result<(), EngineError> {
    let now = Utc::now().with_timezone(&config::region_offset());

    snooze::sweep_expired(conn, now)?;

    if let Some(profile) = get_profile(conn)? {
        let medications = get_all_medications(conn)?;
        adherence::sweep_missed_for_today(conn, &medications, &profile, now)?;
    }
    Ok(())
}
