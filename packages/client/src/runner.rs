//! Client runtime: wires the realtime channel, the controller, terminal input
//! and timers into one event loop.
//!
//! The controller is owned by this loop alone; the input thread and the
//! socket tasks only send messages into it.

use std::{io, path::PathBuf, time::Duration};

use hiroba_shared::time::{millis_to_jst_rfc3339, now_millis};
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, RepeatCount, error::ReadlineError,
};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    config::{ClientConfig, PushArgs},
    domain::{Timestamp, UiState, UiStateRepository, UserName},
    error::ClientError,
    infrastructure::{
        attachment, notification::TerminalNotifier, push::handle_background_push, realtime,
        repository::FileUiStateRepository,
    },
    ui::{
        command::{Command, CommandOutcome, apply_command},
        handler::handle_server_event,
        terminal::TerminalView,
    },
    usecase::ChatFeedController,
};

/// Input from the line editor thread
#[derive(Debug)]
enum InputEvent {
    Line(String),
    /// A character key was pressed while composing
    Keystroke,
    Closed,
}

/// Reports every character key to the event loop without changing editing
struct KeystrokeSignal {
    tx: UnboundedSender<InputEvent>,
}

impl ConditionalEventHandler for KeystrokeSignal {
    fn handle(&self, evt: &Event, _: RepeatCount, _: bool, _: &EventContext) -> Option<Cmd> {
        if let Some(KeyEvent(KeyCode::Char(_), _)) = evt.get(0) {
            let _ = self.tx.send(InputEvent::Keystroke);
        }
        None
    }
}

fn now() -> Timestamp {
    Timestamp::new(now_millis())
}

/// Start the line editor on its own thread
fn spawn_input(tx: UnboundedSender<InputEvent>) -> Result<(), ClientError> {
    let mut editor = DefaultEditor::new()?;
    editor.bind_sequence(
        Event::Any,
        EventHandler::Conditional(Box::new(KeystrokeSignal { tx: tx.clone() })),
    );

    std::thread::spawn(move || {
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    let _ = tx.send(InputEvent::Closed);
                    break;
                }
                Err(e) => {
                    tracing::error!("Input error: {}", e);
                    let _ = tx.send(InputEvent::Closed);
                    break;
                }
            }
        }
    });
    Ok(())
}

async fn persist(repository: &impl UiStateRepository, controller: &mut ChatFeedController) {
    if let Some(state) = controller.take_dirty_ui_state()
        && let Err(e) = repository.save(&state).await
    {
        tracing::warn!("Failed to save UI state: {}", e);
    }
}

/// Read an image in the background and hand the data URI back to the loop
fn spawn_attachment(path: PathBuf, tx: UnboundedSender<(PathBuf, io::Result<String>)>) {
    tokio::spawn(async move {
        let result = attachment::load_image(&path).await;
        let _ = tx.send((path, result));
    });
}

/// Join the chat room and run until the user quits or the server goes away
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let username = UserName::new(config.username.clone())?;
    tracing::info!(
        "Session for '{}' started at {}",
        username,
        millis_to_jst_rfc3339(now_millis())
    );

    let repository = FileUiStateRepository::new(&config.state_file);
    let ui_state = match repository.load(&username).await {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("Failed to load UI state, starting fresh: {}", e);
            UiState::new(username.clone())
        }
    };

    let (channel, mut events) = realtime::connect(&config.url).await?;
    let mut controller = ChatFeedController::new(
        config.feed.clone(),
        username,
        ui_state,
        Box::new(channel),
        Box::new(TerminalNotifier::stderr()),
    );

    let (input_tx, mut input) = mpsc::unbounded_channel();
    spawn_input(input_tx)?;
    let (attach_tx, mut attachments) = mpsc::unbounded_channel();

    let mut view = TerminalView::new(io::stdout());

    loop {
        let wait = controller
            .next_deadline()
            .map(|deadline| Duration::from_millis(now().millis_until(deadline)));

        let redraw = tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    handle_server_event(&mut controller, event, now());
                    true
                }
                None => {
                    tracing::info!("Connection closed");
                    break;
                }
            },
            line = input.recv() => match line {
                Some(InputEvent::Line(line)) => {
                    view.clear_status();
                    match apply_command(&mut controller, Command::parse(&line), now()) {
                        CommandOutcome::Redraw => {}
                        CommandOutcome::Status(status) => view.set_status(status),
                        CommandOutcome::AttachImage(path) => {
                            view.set_status(format!("Reading {}", path.display()));
                            spawn_attachment(path, attach_tx.clone());
                        }
                        CommandOutcome::Quit => break,
                    }
                    true
                }
                Some(InputEvent::Keystroke) => {
                    controller.on_keystroke(now());
                    false
                }
                Some(InputEvent::Closed) | None => break,
            },
            Some((path, result)) = attachments.recv() => {
                match result {
                    Ok(image) => {
                        view.clear_status();
                        if let Err(e) = controller.compose_and_send("", Some(image)) {
                            view.set_status(e.to_string());
                        }
                    }
                    Err(e) => view.set_status(format!("Cannot read {}: {}", path.display(), e)),
                }
                true
            },
            _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {
                controller.poll_timers(now());
                true
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        persist(&repository, &mut controller).await;
        if redraw && let Err(e) = view.draw(&controller) {
            tracing::warn!("Failed to draw: {}", e);
        }
    }

    persist(&repository, &mut controller).await;
    tracing::info!("Client stopped");
    Ok(())
}

/// Show one background push payload and exit
pub fn run_push(args: PushArgs) -> Result<(), ClientError> {
    let mut notifier = TerminalNotifier::stderr();
    handle_background_push(&args.payload, &mut notifier, !args.no_notifications)?;
    Ok(())
}
