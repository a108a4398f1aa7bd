//! Compose line parsing and dispatch.
//!
//! A line that does not start with `/` is sent as a message; everything else
//! is a slash command operating on message ids shown in the feed.

use std::path::PathBuf;

use crate::{
    domain::{MessageId, Timestamp},
    usecase::ChatFeedController,
};

/// Lines scrolled by `/up` and `/down` without a count
const DEFAULT_SCROLL_LINES: isize = 5;

pub const HELP: &str = "\
/reply <id>          reply to a message      /cancel        drop the reply
/edit <id> <text>    edit your message       /delete <id>   delete your message
/yes | /no           answer a delete prompt  /react <id> <emoji>
/image <path>        send an image           /more          load older messages
/up [n] | /down [n]  scroll                  /jump <id>     show a message
/away | /back        leave or return         /quit";

/// Parsed compose line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Reply(MessageId),
    CancelReply,
    Edit { id: MessageId, text: String },
    Delete(MessageId),
    ConfirmDelete(bool),
    React { id: MessageId, emoji: String },
    Image(PathBuf),
    More,
    Scroll(isize),
    Jump(MessageId),
    Away,
    Back,
    Help,
    Quit,
    Empty,
    /// Unknown command or bad arguments, with a usage hint
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "reply" => with_id(args, "/reply <id>", Command::Reply),
            "cancel" => Command::CancelReply,
            "edit" => with_id_and_text(args, "/edit <id> <text>", |id, text| Command::Edit {
                id,
                text,
            }),
            "delete" => with_id(args, "/delete <id>", Command::Delete),
            "yes" => Command::ConfirmDelete(true),
            "no" => Command::ConfirmDelete(false),
            "react" => with_id_and_text(args, "/react <id> <emoji>", |id, emoji| {
                Command::React { id, emoji }
            }),
            "image" if !args.is_empty() => Command::Image(PathBuf::from(args)),
            "image" => Command::Invalid("usage: /image <path>".to_string()),
            "more" => Command::More,
            "up" => scroll(args, -1),
            "down" => scroll(args, 1),
            "jump" => with_id(args, "/jump <id>", Command::Jump),
            "away" => Command::Away,
            "back" => Command::Back,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command '/{other}', try /help")),
        }
    }
}

fn with_id(args: &str, usage: &str, build: impl FnOnce(MessageId) -> Command) -> Command {
    match MessageId::new(args.to_string()) {
        Ok(id) if !args.contains(char::is_whitespace) => build(id),
        _ => Command::Invalid(format!("usage: {usage}")),
    }
}

fn with_id_and_text(
    args: &str,
    usage: &str,
    build: impl FnOnce(MessageId, String) -> Command,
) -> Command {
    let Some((id, text)) = args.split_once(char::is_whitespace) else {
        return Command::Invalid(format!("usage: {usage}"));
    };
    match MessageId::new(id.to_string()) {
        Ok(id) => build(id, text.trim().to_string()),
        Err(_) => Command::Invalid(format!("usage: {usage}")),
    }
}

fn scroll(args: &str, direction: isize) -> Command {
    if args.is_empty() {
        return Command::Scroll(direction * DEFAULT_SCROLL_LINES);
    }
    match args.parse::<isize>() {
        Ok(lines) if lines > 0 => Command::Scroll(direction * lines),
        _ => Command::Invalid("usage: /up [lines] or /down [lines]".to_string()),
    }
}

/// What the caller has to do after a command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The feed may have changed
    Redraw,
    /// Show a status line to the user
    Status(String),
    /// Read the file and send it as an image
    AttachImage(PathBuf),
    Quit,
}

/// Run `command` against the controller
pub fn apply_command(
    controller: &mut ChatFeedController,
    command: Command,
    now: Timestamp,
) -> CommandOutcome {
    let result = match command {
        Command::Empty => return CommandOutcome::Redraw,
        Command::Send(text) => controller.compose_and_send(&text, None),
        Command::Reply(id) => controller.start_reply(&id).map(|_| ()),
        Command::CancelReply => {
            controller.cancel_reply();
            Ok(())
        }
        Command::Edit { id, text } => controller.request_edit(&id, &text),
        Command::Delete(id) => controller.request_delete(&id),
        Command::ConfirmDelete(accepted) => controller.confirm_delete(accepted).map(|_| ()),
        Command::React { id, emoji } => controller.add_reaction(&id, &emoji),
        Command::Image(path) => return CommandOutcome::AttachImage(path),
        Command::More => {
            if !controller.on_more_history_requested() {
                return CommandOutcome::Status("No older messages to load".to_string());
            }
            Ok(())
        }
        Command::Scroll(lines) => {
            controller.scroll_by(lines);
            Ok(())
        }
        Command::Jump(id) => {
            if !controller.jump_to_reply(&id, now) {
                return CommandOutcome::Status(format!("Message '{id}' is not loaded"));
            }
            Ok(())
        }
        Command::Away => {
            controller.on_visibility_change(false);
            Ok(())
        }
        Command::Back => {
            controller.on_visibility_change(true);
            Ok(())
        }
        Command::Help => return CommandOutcome::Status(HELP.to_string()),
        Command::Quit => return CommandOutcome::Quit,
        Command::Invalid(usage) => return CommandOutcome::Status(usage),
    };

    match result {
        Ok(()) => CommandOutcome::Redraw,
        Err(e) => CommandOutcome::Status(e.to_string()),
    }
}
