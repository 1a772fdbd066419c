//! Shared test utilities for `TicketWarden`.
//!
//! Helpers for building file-backed stores in unique temp locations and
//! controllers with the canned three-topic onboarding configuration.

use crate::config::content::Stage;
use crate::core::tickets::TicketController;
use crate::store::TimestampStore;
use chrono::Duration;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// A store path that no other test (or prior run) is using.
pub fn temp_store_path(tag: &str) -> PathBuf {
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "ticket-warden-test-{}-{tag}-{n}.json",
        std::process::id()
    ))
}

/// A controller with the given topics/stages, fresh empty stores, and
/// the default 48 h cooldown and 72 h idle thresholds.
pub fn controller_with(tag: &str, topics: Vec<String>, stages: Vec<Stage>) -> TicketController {
    let activity = TimestampStore::load(temp_store_path(&format!("{tag}-activity")));
    let cooldowns = TimestampStore::load(temp_store_path(&format!("{tag}-cooldowns")));
    TicketController::new(
        topics,
        stages,
        Duration::hours(48),
        Duration::hours(72),
        activity,
        cooldowns,
    )
}

/// A controller with the standard three topics and both verification
/// stages - the full onboarding pipeline.
pub fn full_controller(tag: &str) -> TicketController {
    controller_with(
        tag,
        vec![
            "rules".to_string(),
            "requirement".to_string(),
            "loadout".to_string(),
        ],
        vec![Stage::Region, Stage::Screenshot],
    )
}
