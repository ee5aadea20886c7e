//! The renderer-agnostic notification message.
//!
//! Composers produce a [`NotificationMessage`]: an ordered sequence of
//! [`MessageSegment`]s that a delivery adapter renders into its own wire
//! format. Keeping mentions, links, and images structural (rather than
//! pre-rendered strings) lets the renderer own escaping and mention syntax.

use serde::{Deserialize, Serialize};

use crate::identifiers::SlackUserId;

/// One piece of a notification message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSegment {
    /// Plain text. Renderers escape it; composers never pre-escape.
    Text(String),
    /// An `@`-style reference to a resolved identity.
    Mention(SlackUserId),
    /// A hyperlink. Without a label, renderers emit the bare URL.
    Link { url: String, label: Option<String> },
    /// An image reference (actor avatar).
    Image { url: String, alt: String },
    /// A line break separating the header from context/body lines.
    Break,
}

/// An ordered sequence of segments; the first [`MessageSegment::Break`] ends
/// the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    segments: Vec<MessageSegment>,
}

impl NotificationMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the segments in composition order.
    pub fn segments(&self) -> &[MessageSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    // Builder-style appenders, used by the composers to keep templates legible.

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(MessageSegment::Text(text.into()));
        self
    }

    pub fn mention(mut self, id: SlackUserId) -> Self {
        self.segments.push(MessageSegment::Mention(id));
        self
    }

    pub fn link(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.segments.push(MessageSegment::Link {
            url: url.into(),
            label: Some(label.into()),
        });
        self
    }

    pub fn bare_link(mut self, url: impl Into<String>) -> Self {
        self.segments.push(MessageSegment::Link {
            url: url.into(),
            label: None,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>, alt: impl Into<String>) -> Self {
        self.segments.push(MessageSegment::Image {
            url: url.into(),
            alt: alt.into(),
        });
        self
    }

    pub fn line_break(mut self) -> Self {
        self.segments.push(MessageSegment::Break);
        self
    }
}
