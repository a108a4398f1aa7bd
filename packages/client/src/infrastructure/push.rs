//! Background push notifications.
//!
//! A push payload delivered while the client is not running is shown as a
//! notification with the fixed chat icon. Nothing else is done with it.

use serde::Deserialize;

use crate::{
    infrastructure::error::DtoError,
    usecase::{DesktopNotification, NOTIFICATION_ICON, NotificationId, Notifier},
};

/// `{"notification": {"title": .., "body": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    pub notification: PushNotificationDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushNotificationDto {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Show the notification carried by a push payload.
///
/// Returns `None` without parsing when notifications are disabled.
pub fn handle_background_push(
    payload: &str,
    notifier: &mut dyn Notifier,
    enabled: bool,
) -> Result<Option<NotificationId>, DtoError> {
    if !enabled {
        tracing::debug!("Notifications disabled, ignoring push payload");
        return Ok(None);
    }
    let payload: PushPayload =
        serde_json::from_str(payload).map_err(|source| DtoError::Malformed {
            event: "push".to_string(),
            source,
        })?;
    tracing::info!("Received background message: {}", payload.notification.title);

    let id = notifier.show(&DesktopNotification {
        title: payload.notification.title,
        body: payload.notification.body,
        icon: NOTIFICATION_ICON.to_string(),
    });
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::port::MockNotifier;

    #[test]
    fn test_push_payload_is_shown_with_fixed_icon() {
        // テスト項目: プッシュのタイトルと本文が固定アイコン付きで表示される
        // given (前提条件):
        let mut notifier = MockNotifier::new();
        notifier
            .expect_show()
            .withf(|n| {
                n.title == "New message" && n.body == "bob: hi" && n.icon == NOTIFICATION_ICON
            })
            .times(1)
            .return_const(NotificationId(1));

        // when (操作):
        let result = handle_background_push(
            r#"{"notification":{"title":"New message","body":"bob: hi"}}"#,
            &mut notifier,
            true,
        );

        // then (期待する結果):
        assert_eq!(result.unwrap(), Some(NotificationId(1)));
    }

    #[test]
    fn test_push_disabled_shows_nothing() {
        // テスト項目: 通知機能が無効なら何も表示しない
        // given (前提条件):
        let mut notifier = MockNotifier::new();
        notifier.expect_show().times(0);

        // when (操作):
        let result = handle_background_push("{}", &mut notifier, false);

        // then (期待する結果):
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_push_without_notification_is_malformed() {
        // テスト項目: notification を含まないペイロードはエラーになる
        // given (前提条件):
        let mut notifier = MockNotifier::new();
        notifier.expect_show().times(0);

        // when (操作):
        let result = handle_background_push(r#"{"data":{}}"#, &mut notifier, true);

        // then (期待する結果):
        assert!(matches!(result, Err(DtoError::Malformed { .. })));
    }
}
