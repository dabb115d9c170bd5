/// Whether desktop notifications may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn request_permission(&self) -> NotificationPermission;
    async fn notify(&self, title: &str, body: &str);
}

/// Shows notifications through `notify-send` (freedesktop notification daemon).
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    async fn request_permission(&self) -> NotificationPermission {
        match tokio::process::Command::new("notify-send")
            .arg("--version")
            .output()
            .await
        {
            Ok(out) if out.status.success() => NotificationPermission::Granted,
            Ok(_) | Err(_) => {
                log::warn!("notify-send unavailable, desktop notifications disabled");
                NotificationPermission::Denied
            }
        }
    }

    async fn notify(&self, title: &str, body: &str) {
        let result = tokio::process::Command::new("notify-send")
            .arg("--app-name=picklist")
            .arg(title)
            .arg(body)
            .status()
            .await;
        match result {
            Ok(status) if status.success() => log::debug!("Notification shown: {}", title),
            Ok(status) => log::warn!("notify-send exited with {}", status),
            Err(e) => log::error!("Failed to show notification: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{NotificationPermission, Notifier};

    /// Records notifications instead of showing them.
    #[derive(Debug)]
    pub struct RecordingNotifier {
        permission: NotificationPermission,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        pub fn new(permission: NotificationPermission) -> Self {
            Self {
                permission,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn request_permission(&self) -> NotificationPermission {
            self.permission
        }

        async fn notify(&self, title: &str, body: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }
}
