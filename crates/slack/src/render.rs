//! Message rendering: [`NotificationMessage`] → Slack mrkdwn and Block Kit.
//!
//! The composers keep mentions, links, and images structural; this module owns
//! the Slack-specific syntax and escaping. Text segments are escaped here and
//! nowhere else — mention and link segments are emitted structurally and must
//! never be escaped, or Slack would show the markup instead of rendering it.

use relay::{MessageSegment, NotificationMessage};
use serde::Serialize;

/// Escapes the three characters Slack requires escaping in message text.
///
/// `&` first, so the other two don't get double-escaped.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the message as one mrkdwn string.
///
/// Used for the webhook's `text` field, which doubles as the client-side
/// notification preview. Image segments have no inline mrkdwn form and only
/// appear in the block rendering.
pub fn render_mrkdwn(message: &NotificationMessage) -> String {
    let mut out = String::new();
    for segment in message.segments() {
        if let MessageSegment::Image { .. } = segment {
            continue;
        }
        push_inline(&mut out, segment);
    }
    out
}

fn push_inline(out: &mut String, segment: &MessageSegment) {
    match segment {
        MessageSegment::Text(text) => out.push_str(&escape_mrkdwn(text)),
        MessageSegment::Mention(id) => {
            out.push_str("<@");
            out.push_str(id.as_str());
            out.push('>');
        }
        MessageSegment::Link {
            url,
            label: Some(label),
        } => {
            out.push('<');
            out.push_str(url);
            out.push('|');
            out.push_str(&escape_mrkdwn(label));
            out.push('>');
        }
        MessageSegment::Link { url, label: None } => out.push_str(url),
        MessageSegment::Break => out.push('\n'),
        // Handled by the caller.
        MessageSegment::Image { .. } => {}
    }
}

// ---------------------------------------------------------------------------
// Block Kit
// ---------------------------------------------------------------------------

/// One Block Kit block; only the two shapes this system emits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: MrkdwnText },
    Context { elements: Vec<ContextElement> },
}

/// A `{"type": "mrkdwn", "text": …}` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MrkdwnText {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: String,
}

impl MrkdwnText {
    fn new(text: String) -> Self {
        Self {
            kind: "mrkdwn",
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    Image {
        image_url: String,
        alt_text: String,
    },
}

/// Renders the message as Block Kit blocks.
///
/// Runs of inline segments become `section` blocks; each image segment becomes
/// a `context` block with an image element, in composition order.
pub fn render_blocks(message: &NotificationMessage) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut buffer = String::new();

    for segment in message.segments() {
        match segment {
            MessageSegment::Image { url, alt } => {
                flush_section(&mut blocks, &mut buffer);
                blocks.push(Block::Context {
                    elements: vec![ContextElement::Image {
                        image_url: url.clone(),
                        alt_text: alt.clone(),
                    }],
                });
            }
            other => push_inline(&mut buffer, other),
        }
    }

    flush_section(&mut blocks, &mut buffer);
    blocks
}

fn flush_section(blocks: &mut Vec<Block>, buffer: &mut String) {
    if buffer.trim().is_empty() {
        buffer.clear();
        return;
    }
    blocks.push(Block::Section {
        text: MrkdwnText::new(std::mem::take(buffer)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay::{NotificationMessage, SlackUserId};

    fn id(value: &str) -> SlackUserId {
        SlackUserId::new(value).unwrap()
    }

    #[test]
    fn escapes_ampersand_first() {
        assert_eq!(escape_mrkdwn("a & <b>"), "a &amp; &lt;b&gt;");
        assert_eq!(escape_mrkdwn("&lt;"), "&amp;lt;");
    }

    #[test]
    fn renders_mentions_and_links_structurally() {
        let message = NotificationMessage::new()
            .mention(id("U1"))
            .text(" has *opened* pull request ")
            .link("https://x/12", "#12 Fix <it>")
            .text(".");
        assert_eq!(
            render_mrkdwn(&message),
            "<@U1> has *opened* pull request <https://x/12|#12 Fix &lt;it&gt;>."
        );
    }

    #[test]
    fn bare_links_render_as_the_url() {
        let message = NotificationMessage::new().bare_link("https://x/c/9");
        assert_eq!(render_mrkdwn(&message), "https://x/c/9");
    }

    #[test]
    fn breaks_become_newlines() {
        let message = NotificationMessage::new()
            .text("header")
            .line_break()
            .text("> quoted");
        assert_eq!(render_mrkdwn(&message), "header\n&gt; quoted");
    }

    #[test]
    fn text_rendering_skips_images() {
        let message = NotificationMessage::new()
            .text("hi")
            .image("https://avatars/a.png", "alice");
        assert_eq!(render_mrkdwn(&message), "hi");
    }

    #[test]
    fn blocks_split_sections_around_images() {
        let message = NotificationMessage::new()
            .mention(id("U1"))
            .text(" opened something")
            .line_break()
            .image("https://avatars/a.png", "alice");
        let blocks = render_blocks(&message);

        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::Section { text } if text.text.starts_with("<@U1>")));
        assert_eq!(
            blocks[1],
            Block::Context {
                elements: vec![ContextElement::Image {
                    image_url: "https://avatars/a.png".into(),
                    alt_text: "alice".into(),
                }],
            }
        );
    }

    #[test]
    fn block_json_matches_the_wire_shape() {
        let blocks = render_blocks(&NotificationMessage::new().text("hello"));
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "section", "text": {"type": "mrkdwn", "text": "hello"}}
            ])
        );
    }

    #[test]
    fn whitespace_only_runs_do_not_produce_empty_sections() {
        let message = NotificationMessage::new()
            .line_break()
            .image("https://avatars/a.png", "alice");
        let blocks = render_blocks(&message);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Context { .. }));
    }
}
