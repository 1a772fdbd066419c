//! The per-channel ticket state machine.
//!
//! A ticket channel moves through: created-locked, reading FAQ topics,
//! optional region capture, optional screenshot verification, open chat,
//! and finally closure. `TicketController` owns all of the state behind
//! those transitions - the two durable timestamp maps and the transient
//! onboarding tracker - and exposes them as plain operations returning
//! outcome values. The bot layer turns outcomes into gateway calls; no
//! other component mutates these maps.

use crate::config::content::Stage;
use crate::core::{cooldown, progress::ProgressTracker, reaper};
use crate::errors::Result;
use crate::store::TimestampStore;
use chrono::Duration;

/// Outcome of acknowledging an FAQ topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The topic id is not part of the configured set.
    UnknownTopic,
    /// The channel already unlocked; nothing to do.
    AlreadyUnlocked,
    /// Progress made, more topics remain.
    Progress { done: usize, total: usize },
    /// The final topic was acknowledged; chat unlocks now, and the
    /// channel enters the first configured verification stage (if any).
    Unlocked { next: Option<Stage> },
}

/// Outcome of offering a message as a region reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionCapture {
    /// The channel is not awaiting a region.
    NotPending,
    /// Staff-authored or blank; not treated as a region reply.
    Ignored,
    /// Region stored; the channel now awaits a screenshot.
    AwaitScreenshot,
    /// Region stored and no later stage is configured; fully open.
    Completed { region: String },
}

/// Outcome of offering a message to the screenshot gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotGate {
    /// The channel is not awaiting a screenshot.
    NotPending,
    /// Staff-authored message; passes through untouched.
    Bypassed,
    /// No attachment; the message must be removed and warned about.
    Blocked,
    /// Attachment received; verification complete.
    Verified { region: Option<String> },
}

/// Owns every ticket map and drives the per-channel state machine.
#[derive(Debug)]
pub struct TicketController {
    topic_ids: Vec<String>,
    stages: Vec<Stage>,
    cooldown_window: Duration,
    max_idle: Duration,
    activity: TimestampStore,
    cooldowns: TimestampStore,
    progress: ProgressTracker,
}

impl TicketController {
    /// Builds a controller over previously loaded stores.
    #[must_use]
    pub fn new(
        topic_ids: Vec<String>,
        stages: Vec<Stage>,
        cooldown_window: Duration,
        max_idle: Duration,
        activity: TimestampStore,
        cooldowns: TimestampStore,
    ) -> Self {
        Self {
            topic_ids,
            stages,
            cooldown_window,
            max_idle,
            activity,
            cooldowns,
            progress: ProgressTracker::default(),
        }
    }

    /// Whether FAQ gating applies. With no configured topics, tickets
    /// open with chat enabled and no verification pipeline.
    #[must_use]
    pub fn gating_enabled(&self) -> bool {
        !self.topic_ids.is_empty()
    }

    /// Checks the requester's cooldown at `now_ms`.
    #[must_use]
    pub fn cooldown_gate(&self, user: u64, now_ms: i64) -> cooldown::Gate {
        cooldown::check(now_ms, self.cooldowns.get(user), self.cooldown_window)
    }

    /// Records a freshly created ticket channel: owner, activity
    /// timestamp, and the requester's cooldown. Both stores persist
    /// before this returns.
    pub fn register_ticket(&mut self, channel: u64, user: u64, now_ms: i64) -> Result<()> {
        self.progress.set_owner(channel, user);
        if !self.gating_enabled() {
            self.progress.mark_unlocked(channel);
        }
        self.activity.set(channel, now_ms)?;
        self.cooldowns.set(user, now_ms)?;
        Ok(())
    }

    /// The user that opened the channel, while it is tracked.
    #[must_use]
    pub fn owner(&self, channel: u64) -> Option<u64> {
        self.progress.owner(channel)
    }

    /// Whether the channel is an open, tracked ticket.
    #[must_use]
    pub fn is_tracked(&self, channel: u64) -> bool {
        self.activity.contains(channel)
    }

    /// Acknowledges one FAQ topic. Idempotent per topic; unlocking
    /// happens exactly once per channel.
    pub fn acknowledge_topic(&mut self, channel: u64, topic: &str) -> Ack {
        if !self.topic_ids.iter().any(|t| t == topic) {
            return Ack::UnknownTopic;
        }
        if self.progress.is_unlocked(channel) {
            return Ack::AlreadyUnlocked;
        }
        let done = self.progress.acknowledge(channel, topic);
        let total = self.topic_ids.len();
        if done < total {
            return Ack::Progress { done, total };
        }
        self.progress.mark_unlocked(channel);
        let next = self.stages.first().copied();
        match next {
            Some(Stage::Region) => self.progress.await_region(channel),
            Some(Stage::Screenshot) => self.progress.await_screenshot(channel),
            None => {}
        }
        Ack::Unlocked { next }
    }

    /// Whether the channel is awaiting a region reply.
    #[must_use]
    pub fn awaiting_region(&self, channel: u64) -> bool {
        self.progress.awaiting_region(channel)
    }

    /// Whether the channel is awaiting a verification screenshot.
    #[must_use]
    pub fn awaiting_screenshot(&self, channel: u64) -> bool {
        self.progress.awaiting_screenshot(channel)
    }

    /// Offers a message as a region reply. Staff-authored and blank
    /// messages are ignored without a state change.
    pub fn capture_region(&mut self, channel: u64, text: &str, staff_author: bool) -> RegionCapture {
        if !self.progress.awaiting_region(channel) {
            return RegionCapture::NotPending;
        }
        if staff_author {
            return RegionCapture::Ignored;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return RegionCapture::Ignored;
        }
        self.progress.capture_region(channel, trimmed.to_string());
        if self.stage_after(Stage::Region) == Some(Stage::Screenshot) {
            self.progress.await_screenshot(channel);
            RegionCapture::AwaitScreenshot
        } else {
            let region = self.progress.take_region(channel).unwrap_or_default();
            RegionCapture::Completed { region }
        }
    }

    /// Offers a message to the screenshot gate. Only an
    /// attachment-bearing message from a non-staff author completes it.
    pub fn screenshot_gate(
        &mut self,
        channel: u64,
        has_attachment: bool,
        staff_author: bool,
    ) -> ScreenshotGate {
        if !self.progress.awaiting_screenshot(channel) {
            return ScreenshotGate::NotPending;
        }
        if staff_author {
            return ScreenshotGate::Bypassed;
        }
        if !has_attachment {
            return ScreenshotGate::Blocked;
        }
        let region = self.progress.complete_screenshot(channel);
        ScreenshotGate::Verified { region }
    }

    /// Refreshes the channel's last-activity timestamp if it is tracked.
    /// Returns whether it was.
    pub fn record_activity(&mut self, channel: u64, now_ms: i64) -> Result<bool> {
        if !self.activity.contains(channel) {
            return Ok(false);
        }
        self.activity.set(channel, now_ms)?;
        Ok(true)
    }

    /// Purges all state for a closed or vanished channel. Returns
    /// whether an activity record existed.
    pub fn end_ticket(&mut self, channel: u64) -> Result<bool> {
        self.progress.forget(channel);
        self.activity.remove(channel)
    }

    /// Deletes a user's cooldown record. Returns whether one existed.
    pub fn reset_cooldown(&mut self, user: u64) -> Result<bool> {
        self.cooldowns.remove(user)
    }

    /// Tracked channels idle past the threshold at `now_ms`.
    #[must_use]
    pub fn expired_tickets(&self, now_ms: i64) -> Vec<u64> {
        reaper::expired(self.activity.entries(), now_ms, self.max_idle)
    }

    fn stage_after(&self, stage: Stage) -> Option<Stage> {
        let idx = self.stages.iter().position(|s| *s == stage)?;
        self.stages.get(idx + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::cooldown::Gate;
    use crate::test_utils::{controller_with, full_controller};

    const CHANNEL: u64 = 500;
    const USER: u64 = 900;
    const HOUR_MS: i64 = 60 * 60 * 1000;

    #[test]
    fn topics_unlock_in_any_order() {
        let mut desk = full_controller("any-order");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();

        assert_eq!(
            desk.acknowledge_topic(CHANNEL, "rules"),
            Ack::Progress { done: 1, total: 3 }
        );
        assert_eq!(
            desk.acknowledge_topic(CHANNEL, "loadout"),
            Ack::Progress { done: 2, total: 3 }
        );
        assert_eq!(
            desk.acknowledge_topic(CHANNEL, "requirement"),
            Ack::Unlocked {
                next: Some(Stage::Region)
            }
        );
        assert!(desk.awaiting_region(CHANNEL));
    }

    #[test]
    fn repeat_acknowledgment_never_double_counts() {
        let mut desk = full_controller("repeat-ack");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();

        desk.acknowledge_topic(CHANNEL, "rules");
        assert_eq!(
            desk.acknowledge_topic(CHANNEL, "rules"),
            Ack::Progress { done: 1, total: 3 }
        );
    }

    #[test]
    fn unlock_fires_exactly_once() {
        let mut desk = full_controller("unlock-once");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();

        for topic in ["rules", "requirement", "loadout"] {
            desk.acknowledge_topic(CHANNEL, topic);
        }
        // A second full pass reports already-unlocked every time.
        for topic in ["rules", "requirement", "loadout"] {
            assert_eq!(desk.acknowledge_topic(CHANNEL, topic), Ack::AlreadyUnlocked);
        }
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let mut desk = full_controller("unknown-topic");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        assert_eq!(desk.acknowledge_topic(CHANNEL, "giveaway"), Ack::UnknownTopic);
    }

    #[test]
    fn region_then_screenshot_pipeline() {
        let mut desk = full_controller("pipeline");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        for topic in ["rules", "requirement", "loadout"] {
            desk.acknowledge_topic(CHANNEL, topic);
        }

        // Staff chatter and blank lines are not region replies.
        assert_eq!(
            desk.capture_region(CHANNEL, "what region are you in?", true),
            RegionCapture::Ignored
        );
        assert_eq!(desk.capture_region(CHANNEL, "   ", false), RegionCapture::Ignored);
        assert!(desk.awaiting_region(CHANNEL));

        assert_eq!(
            desk.capture_region(CHANNEL, "  EU West ", false),
            RegionCapture::AwaitScreenshot
        );
        assert!(!desk.awaiting_region(CHANNEL));
        assert!(desk.awaiting_screenshot(CHANNEL));

        // A second reply is no longer a region.
        assert_eq!(
            desk.capture_region(CHANNEL, "NA actually", false),
            RegionCapture::NotPending
        );

        // Text without an attachment is blocked; staff pass through.
        assert_eq!(
            desk.screenshot_gate(CHANNEL, false, false),
            ScreenshotGate::Blocked
        );
        assert_eq!(
            desk.screenshot_gate(CHANNEL, false, true),
            ScreenshotGate::Bypassed
        );

        assert_eq!(
            desk.screenshot_gate(CHANNEL, true, false),
            ScreenshotGate::Verified {
                region: Some("EU West".to_string())
            }
        );
        assert!(!desk.awaiting_screenshot(CHANNEL));
        assert_eq!(
            desk.screenshot_gate(CHANNEL, true, false),
            ScreenshotGate::NotPending
        );
    }

    #[test]
    fn no_stages_unlocks_straight_to_open() {
        let mut desk = controller_with(
            "no-stages",
            vec!["rules".to_string()],
            Vec::new(),
        );
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        assert_eq!(
            desk.acknowledge_topic(CHANNEL, "rules"),
            Ack::Unlocked { next: None }
        );
        assert!(!desk.awaiting_region(CHANNEL));
        assert!(!desk.awaiting_screenshot(CHANNEL));
    }

    #[test]
    fn region_only_stage_completes_on_capture() {
        let mut desk = controller_with(
            "region-only",
            vec!["rules".to_string()],
            vec![Stage::Region],
        );
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        desk.acknowledge_topic(CHANNEL, "rules");
        assert_eq!(
            desk.capture_region(CHANNEL, "Asia", false),
            RegionCapture::Completed {
                region: "Asia".to_string()
            }
        );
        assert!(!desk.awaiting_screenshot(CHANNEL));
    }

    #[test]
    fn no_topics_means_no_gating() {
        let mut desk = controller_with("no-topics", Vec::new(), Vec::new());
        assert!(!desk.gating_enabled());
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        // With no configured topics, a stray button click matches nothing.
        assert_eq!(desk.acknowledge_topic(CHANNEL, "rules"), Ack::UnknownTopic);
        assert!(!desk.awaiting_region(CHANNEL));
    }

    #[test]
    fn cooldown_denies_then_allows() {
        let mut desk = full_controller("cooldown");
        assert_eq!(desk.cooldown_gate(USER, 0), Gate::Allowed);
        desk.register_ticket(CHANNEL, USER, 0).unwrap();

        // One hour later: denied with ~47h left.
        match desk.cooldown_gate(USER, HOUR_MS) {
            Gate::Denied(remaining) => assert_eq!(remaining, Duration::hours(47)),
            Gate::Allowed => panic!("expected denial one hour in"),
        }
        // Just past the boundary: allowed again.
        assert_eq!(desk.cooldown_gate(USER, 48 * HOUR_MS + 1_000), Gate::Allowed);
    }

    #[test]
    fn reset_cooldown_reports_presence() {
        let mut desk = full_controller("reset");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        assert!(desk.reset_cooldown(USER).unwrap());
        assert!(!desk.reset_cooldown(USER).unwrap());
        assert_eq!(desk.cooldown_gate(USER, 1), Gate::Allowed);
    }

    #[test]
    fn activity_refresh_only_for_tracked_channels() {
        let mut desk = full_controller("activity");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        assert!(desk.record_activity(CHANNEL, 5_000).unwrap());
        assert!(!desk.record_activity(CHANNEL + 1, 5_000).unwrap());
    }

    #[test]
    fn end_ticket_purges_all_state() {
        let mut desk = full_controller("end");
        desk.register_ticket(CHANNEL, USER, 0).unwrap();
        desk.acknowledge_topic(CHANNEL, "rules");
        assert!(desk.end_ticket(CHANNEL).unwrap());
        assert!(!desk.is_tracked(CHANNEL));
        assert_eq!(desk.owner(CHANNEL), None);
        // Purging again reports nothing to remove.
        assert!(!desk.end_ticket(CHANNEL).unwrap());
    }

    #[test]
    fn expired_tickets_respect_threshold() {
        let mut desk = full_controller("expired");
        let now = 1_000 * HOUR_MS;
        desk.register_ticket(10, 1, now - 73 * HOUR_MS).unwrap();
        desk.register_ticket(11, 2, now - 10 * HOUR_MS).unwrap();
        assert_eq!(desk.expired_tickets(now), vec![10]);
    }
}
