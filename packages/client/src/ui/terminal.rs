//! Terminal drawing of the feed.
//!
//! Every entry takes exactly `FeedEntry::height()` lines so the viewport
//! arithmetic of the feed view matches what is printed.

use std::io::Write;

use crate::usecase::ChatFeedController;

use super::{
    feed_view::FeedEntry,
    render::{BubbleStyle, MessageAction},
};

/// Data URIs longer than this are summarized instead of printed
const MAX_IMAGE_SRC_CHARS: usize = 60;

/// Lines of one feed entry, top to bottom
pub fn entry_lines(entry: &FeedEntry) -> Vec<String> {
    let rendered = &entry.rendered;
    let mut lines = Vec::with_capacity(entry.height());

    let marker = if entry.highlighted { ">>" } else { "  " };
    let author = match rendered.bubble {
        BubbleStyle::Own => format!("{} (you)", rendered.author),
        BubbleStyle::Other => format!("@{}", rendered.author),
    };
    let seen = if entry.seen_by_others { " [seen]" } else { "" };
    let actions = rendered
        .actions
        .iter()
        .map(MessageAction::label)
        .collect::<Vec<_>>()
        .join("|");
    lines.push(format!(
        "{marker}[{}] {author}: {}{seen}  ({actions})",
        rendered.id, rendered.body
    ));

    if let Some(reply) = &rendered.reply {
        lines.push(format!("      ↪ [{}] {}", reply.target, reply.snippet));
    }
    if let Some(image) = &rendered.image {
        lines.push(format!("      [image] {}", summarize_image(image)));
    }
    if !entry.reactions.is_empty() {
        let reactions = entry
            .reactions
            .iter()
            .map(|(emoji, count)| format!("{emoji} {count}"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(format!("      {reactions}"));
    }

    lines
}

fn summarize_image(src: &str) -> String {
    if src.chars().count() <= MAX_IMAGE_SRC_CHARS {
        return src.to_string();
    }
    match src.split_once(',') {
        Some((header, data)) if src.starts_with("data:") => {
            format!("{header} ({} chars)", data.len())
        }
        _ => {
            let head: String = src.chars().take(MAX_IMAGE_SRC_CHARS).collect();
            format!("{head}…")
        }
    }
}

/// Whole screen as text: title, roster, viewport, typing and compose state
pub fn render_screen(controller: &ChatFeedController) -> String {
    let feed = controller.feed();
    let mut out = Vec::new();

    let status = if controller.is_connected() {
        "online"
    } else {
        "offline"
    };
    out.push(format!("== {} == [{status}]", controller.window_title()));

    if !controller.roster().is_empty() {
        let users = controller
            .roster()
            .iter()
            .map(|member| {
                let dot = if member.online { "●" } else { "○" };
                let friend = if member.is_friend { "★" } else { "" };
                format!("{dot}{}{friend}", member.username)
            })
            .collect::<Vec<_>>()
            .join(" ");
        out.push(format!("Users: {users}"));
    }

    if controller.is_loading_more() {
        out.push("  … loading older messages".to_string());
    } else if controller.load_more_available() {
        out.push("  ↑ older messages available (/more)".to_string());
    }

    let lines: Vec<String> = feed.entries().flat_map(entry_lines).collect();
    out.extend(
        lines
            .into_iter()
            .skip(feed.scroll_top())
            .take(feed.viewport_height()),
    );

    if let Some(summary) = controller.typing_summary() {
        out.push(summary);
    }
    if let Some(reply) = controller.reply_context() {
        out.push(format!("Replying to: {} (/cancel)", reply.snippet));
    }
    if let Some(draft) = controller.draft() {
        out.push(format!("Sending: {draft}"));
    }
    if let Some(id) = controller.pending_delete() {
        out.push(format!("Delete message [{id}]? /yes or /no"));
    }

    out.join("\n")
}

/// Redraws the screen on a terminal stream
pub struct TerminalView<W: Write> {
    out: W,
    status: Option<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, status: None }
    }

    /// Show `status` under the feed until the next one
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&mut self, controller: &ChatFeedController) -> std::io::Result<()> {
        // clear screen, cursor home
        write!(self.out, "\x1b[2J\x1b[H")?;
        writeln!(self.out, "{}", render_screen(controller))?;
        if let Some(status) = &self.status {
            writeln!(self.out, "{status}")?;
        }
        self.out.flush()
    }
}
