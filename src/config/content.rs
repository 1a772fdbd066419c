//! Onboarding content loading from config.toml
//!
//! This module provides the deployment-editable content: the FAQ topics a
//! ticket owner must acknowledge, the ordered verification stages that run
//! after chat unlocks, the welcome message template, and the presence text.
//! Deployments that want the simple flow delete the `stages` list and get
//! unlock-straight-to-open behavior.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// The entire config.toml file.
#[derive(Debug, Deserialize, Default)]
pub struct Content {
    /// Post-unlock verification pipeline.
    #[serde(default)]
    pub onboarding: Onboarding,
    /// FAQ topics, one button each, in display order.
    #[serde(default)]
    pub topics: Vec<Topic>,
    /// New-member welcome message.
    #[serde(default)]
    pub welcome: Welcome,
    /// Bot presence.
    #[serde(default)]
    pub presence: Presence,
}

/// Ordered list of verification stages that run once all topics are
/// acknowledged. An empty list unlocks straight into open chat.
#[derive(Debug, Deserialize, Default)]
pub struct Onboarding {
    #[serde(default)]
    pub stages: Vec<Stage>,
}

/// One post-unlock verification stage.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The owner must reply with their region before proceeding.
    Region,
    /// The owner must post a screenshot; other messages are removed.
    Screenshot,
}

/// One FAQ topic: a button label and the response shown on click.
#[derive(Debug, Deserialize, Clone)]
pub struct Topic {
    pub id: String,
    pub label: String,
    pub response: String,
}

/// Welcome message template. `{user}` becomes a mention; `{rules}` and
/// `{giveaway}` become channel links when those channels are configured.
#[derive(Debug, Deserialize, Default)]
pub struct Welcome {
    pub message: Option<String>,
}

/// Presence shown under the bot's name.
#[derive(Debug, Deserialize, Default)]
pub struct Presence {
    pub playing: Option<String>,
}

impl Content {
    /// Topic ids in display order.
    #[must_use]
    pub fn topic_ids(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.id.clone()).collect()
    }

    /// Looks up a topic by id.
    #[must_use]
    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }
}

/// Loads content configuration from a TOML file.
pub fn load_content<P: AsRef<Path>>(path: P) -> Result<Content> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read content file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads content from the default location (./config.toml).
pub fn load_default_content() -> Result<Content> {
    load_content("config.toml")
}
