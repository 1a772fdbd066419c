//! Transcript rendering for closed tickets.
//!
//! The close command fetches a bounded window of recent messages and
//! DMs the requester a plain-text log. Rendering is pure so the format
//! is testable without a gateway.

/// Upper bound on how many messages a transcript covers.
pub const FETCH_LIMIT: u8 = 100;

/// One message, already reduced to what the transcript needs.
#[derive(Debug, Clone)]
pub struct Line {
    /// Author display name.
    pub author: String,
    /// Message text (may be empty for attachment-only messages).
    pub content: String,
    /// Attachment file names, in upload order.
    pub attachments: Vec<String>,
}

/// Renders messages (oldest first) as `author: content [a, b]` lines.
#[must_use]
pub fn render(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.author);
        out.push_str(": ");
        out.push_str(&line.content);
        if !line.attachments.is_empty() {
            out.push_str(" [");
            out.push_str(&line.attachments.join(", "));
            out.push(']');
        }
        out.push('\n');
    }
    out
}

/// Picks the ticket requester out of the channel's per-member access
/// entries: the one member granted explicit access that is not the bot.
#[must_use]
pub fn requester(member_overwrites: &[u64], bot_id: u64) -> Option<u64> {
    member_overwrites.iter().copied().find(|id| *id != bot_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(author: &str, content: &str, attachments: &[&str]) -> Line {
        Line {
            author: author.to_string(),
            content: content.to_string(),
            attachments: attachments.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn renders_in_given_order_with_attachments() {
        let lines = vec![
            line("warden", "Hello | Welcome to support!", &[]),
            line("player", "here are my stats", &["stats.png", "rank.png"]),
            line("manager", "looks good", &[]),
        ];
        let text = render(&lines);
        assert_eq!(
            text,
            "warden: Hello | Welcome to support!\n\
             player: here are my stats [stats.png, rank.png]\n\
             manager: looks good\n"
        );
    }

    #[test]
    fn renders_attachment_only_messages() {
        let text = render(&[line("player", "", &["proof.png"])]);
        assert_eq!(text, "player:  [proof.png]\n");
    }

    #[test]
    fn requester_skips_the_bot() {
        assert_eq!(requester(&[42, 77], 42), Some(77));
        assert_eq!(requester(&[77, 42], 42), Some(77));
        assert_eq!(requester(&[42], 42), None);
        assert_eq!(requester(&[], 42), None);
    }
}
