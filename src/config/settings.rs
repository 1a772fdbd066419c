//! Environment-variable settings.
//!
//! All Discord identifiers come from the environment (usually a `.env`
//! file). Role entries are allowed to carry a trailing `#` comment after
//! the id, because that is how the deployment files annotate them;
//! anything that does not normalize to a plausible snowflake is skipped
//! with a warning rather than failing startup.

use std::env;
use std::path::PathBuf;
use tracing::warn;

/// How long a user must wait between ticket creations, by default.
pub const DEFAULT_COOLDOWN_HOURS: i64 = 48;

/// How long a ticket may sit idle before the hourly sweep closes it.
pub const DEFAULT_IDLE_HOURS: i64 = 72;

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Guild to register commands in; global registration when absent.
    pub guild_id: Option<u64>,
    /// Moderator role - may use the staff commands and bypasses gating.
    pub moderator_role: Option<u64>,
    /// Admin role - treated as staff for gating bypass.
    pub admin_role: Option<u64>,
    /// Roles allowed to close tickets (beyond admins and the moderator role).
    pub close_roles: Vec<u64>,
    /// Category new ticket channels are created under.
    pub ticket_category: Option<u64>,
    /// Channel new-member welcomes are posted in.
    pub welcome_channel: Option<u64>,
    /// Rules channel, referenced by the welcome template.
    pub rules_channel: Option<u64>,
    /// Giveaway channel, referenced by the welcome template.
    pub giveaway_channel: Option<u64>,
    /// Channel the ticket panel is expected to live in.
    pub panel_channel: Option<u64>,
    /// The single identity allowed to use the hidden cooldown reset.
    pub owner_id: Option<u64>,
    /// Ticket-creation cooldown window, in hours.
    pub cooldown_hours: i64,
    /// Inactivity threshold for the hourly sweep, in hours.
    pub idle_hours: i64,
    /// Backing file for the ticket activity map.
    pub activity_file: PathBuf,
    /// Backing file for the cooldown map.
    pub cooldown_file: PathBuf,
}

impl Settings {
    /// Every role id that counts as staff for onboarding-gating bypass
    /// and for the ticket-channel access list.
    #[must_use]
    pub fn staff_roles(&self) -> Vec<u64> {
        let mut roles = Vec::new();
        roles.extend(self.moderator_role);
        roles.extend(self.admin_role);
        roles.extend(self.close_roles.iter().copied());
        roles
    }

    /// Role ids that authorize the close command (moderator + close roles).
    #[must_use]
    pub fn closing_roles(&self) -> Vec<u64> {
        let mut roles = Vec::new();
        roles.extend(self.moderator_role);
        roles.extend(self.close_roles.iter().copied());
        roles
    }
}

/// Loads settings from the environment. Missing identifiers disable the
/// corresponding feature; malformed ones are skipped with a warning.
pub fn load() -> Settings {
    Settings {
        guild_id: id_var("GUILD_ID"),
        moderator_role: id_var("MOD_ROLE_ID"),
        admin_role: id_var("ADMIN_ROLE_ID"),
        close_roles: ["CLOSE_ROLE_ID_1", "CLOSE_ROLE_ID_2", "CLOSE_ROLE_ID_3"]
            .iter()
            .copied()
            .filter_map(id_var)
            .collect(),
        ticket_category: id_var("TICKET_CATEGORY_ID"),
        welcome_channel: id_var("WELCOME_CHANNEL_ID"),
        rules_channel: id_var("RULES_CHANNEL_ID"),
        giveaway_channel: id_var("GIVEAWAY_CHANNEL_ID"),
        panel_channel: id_var("TICKET_PANEL_CHANNEL_ID"),
        owner_id: id_var("SECRET_OWNER_ID"),
        cooldown_hours: hours_var("TICKET_COOLDOWN_HOURS", DEFAULT_COOLDOWN_HOURS),
        idle_hours: hours_var("TICKET_IDLE_HOURS", DEFAULT_IDLE_HOURS),
        activity_file: env::var("TICKETS_FILE")
            .map_or_else(|_| PathBuf::from("tickets.json"), PathBuf::from),
        cooldown_file: env::var("COOLDOWNS_FILE")
            .map_or_else(|_| PathBuf::from("cooldowns.json"), PathBuf::from),
    }
}

fn id_var(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    let parsed = normalize_id(&raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!("Ignoring {name}: {raw:?} is not a valid id");
    }
    parsed
}

fn hours_var(name: &str, default: i64) -> i64 {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {name}: {raw:?} is not a number of hours");
            default
        }),
        Err(_) => default,
    }
}

/// Normalizes one configured identifier: strips a trailing `#` comment,
/// trims whitespace, and accepts only a 17-20 digit snowflake.
#[must_use]
pub fn normalize_id(raw: &str) -> Option<u64> {
    let id = raw.split('#').next().unwrap_or_default().trim();
    if (17..=20).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit()) {
        id.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_plain_snowflake() {
        assert_eq!(normalize_id("123456789012345678"), Some(123_456_789_012_345_678));
    }

    #[test]
    fn normalize_strips_inline_comment() {
        assert_eq!(
            normalize_id("123456789012345678 # tryout manager"),
            Some(123_456_789_012_345_678)
        );
        assert_eq!(
            normalize_id("  987654321098765432   #co-lead"),
            Some(987_654_321_098_765_432)
        );
    }

    #[test]
    fn normalize_rejects_malformed_entries() {
        assert_eq!(normalize_id(""), None);
        assert_eq!(normalize_id("   "), None);
        assert_eq!(normalize_id("not-a-role"), None);
        // Too short to be a snowflake.
        assert_eq!(normalize_id("12345"), None);
        // Too long.
        assert_eq!(normalize_id("123456789012345678901"), None);
        // Comment only.
        assert_eq!(normalize_id("# placeholder"), None);
        // Digits mixed with junk.
        assert_eq!(normalize_id("12345678901234567x"), None);
    }

    #[test]
    fn staff_roles_collects_all_configured_roles() {
        let settings = Settings {
            guild_id: None,
            moderator_role: Some(1),
            admin_role: Some(2),
            close_roles: vec![3, 4],
            ticket_category: None,
            welcome_channel: None,
            rules_channel: None,
            giveaway_channel: None,
            panel_channel: None,
            owner_id: None,
            cooldown_hours: DEFAULT_COOLDOWN_HOURS,
            idle_hours: DEFAULT_IDLE_HOURS,
            activity_file: PathBuf::from("tickets.json"),
            cooldown_file: PathBuf::from("cooldowns.json"),
        };
        assert_eq!(settings.staff_roles(), vec![1, 2, 3, 4]);
        assert_eq!(settings.closing_roles(), vec![1, 3, 4]);
    }
}
