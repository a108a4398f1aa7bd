//! Terminal implementation of the `Notifier` port.
//!
//! Notifications are printed as a single line with a bell; alerts are
//! printed in a box so they stand out from the feed.

use std::io::{self, Write};

use crate::{
    domain::NotificationPermission,
    usecase::{DesktopNotification, NotificationId, Notifier},
};

/// Notifier writing to a terminal stream
pub struct TerminalNotifier<W: Write + Send> {
    out: W,
    /// Answer given when permission is requested
    permission: NotificationPermission,
    next_id: u64,
    open: Vec<NotificationId>,
}

impl TerminalNotifier<io::Stderr> {
    /// Notifier on stderr that grants permission when asked
    pub fn stderr() -> Self {
        Self::new(io::stderr(), NotificationPermission::Granted)
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W, permission: NotificationPermission) -> Self {
        Self {
            out,
            permission,
            next_id: 0,
            open: Vec::new(),
        }
    }

    /// Notifications shown and not dismissed yet
    pub fn open_notifications(&self) -> &[NotificationId] {
        &self.open
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write notification: {}", e);
        }
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn request_permission(&mut self) -> NotificationPermission {
        self.permission
    }

    fn show(&mut self, notification: &DesktopNotification) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.write_line(&format!(
            "\x07[{}] {}: {}",
            notification.icon, notification.title, notification.body
        ));
        self.open.push(id);
        id
    }

    fn dismiss(&mut self, id: NotificationId) {
        self.open.retain(|open| *open != id);
    }

    fn alert(&mut self, message: &str) {
        let rule = "!".repeat(message.chars().count().min(60) + 4);
        self.write_line(&format!("{rule}\n! {message} !\n{rule}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::NOTIFICATION_ICON;

    fn notification(title: &str) -> DesktopNotification {
        DesktopNotification {
            title: title.to_string(),
            body: "hi".to_string(),
            icon: NOTIFICATION_ICON.to_string(),
        }
    }

    #[test]
    fn test_show_and_dismiss() {
        // テスト項目: 表示した通知に一意の ID が振られ、閉じると一覧から消える
        // given (前提条件):
        let mut notifier = TerminalNotifier::new(Vec::new(), NotificationPermission::Granted);

        // when (操作):
        let first = notifier.show(&notification("New message from bob"));
        let second = notifier.show(&notification("New message from carol"));
        notifier.dismiss(first);
        notifier.dismiss(first);

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(notifier.open_notifications(), &[second]);
        let out = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(out.contains("New message from bob: hi"));
        assert!(out.contains(NOTIFICATION_ICON));
    }

    #[test]
    fn test_alert_is_written() {
        // テスト項目: アラートの文言が出力される
        // given (前提条件):
        let mut notifier = TerminalNotifier::new(Vec::new(), NotificationPermission::Denied);

        // when (操作):
        notifier.alert("Your message was not sent: spam");

        // then (期待する結果):
        assert_eq!(
            notifier.request_permission(),
            NotificationPermission::Denied
        );
        let out = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(out.contains("! Your message was not sent: spam !"));
    }
}
