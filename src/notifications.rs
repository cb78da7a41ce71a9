use crate::surfaces::{Notifier, ToastLevel};
use std::cell::RefCell;

/// One notification as it would be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: ToastLevel,
    /// Set for the default per-command notifications.
    pub command: Option<String>,
}

/// Reference [`Notifier`] that records everything it is asked to show and
/// logs it. A UI drains it with [`NotificationCenter::take`].
#[derive(Debug, Default)]
pub struct NotificationCenter {
    shown: RefCell<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.shown.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.shown.borrow_mut())
    }

    /// Ids of commands that got a default success notification.
    pub fn successes(&self) -> Vec<String> {
        self.shown
            .borrow()
            .iter()
            .filter(|n| n.level == ToastLevel::Success)
            .filter_map(|n| n.command.clone())
            .collect()
    }

    /// `(command id, error)` for every default error notification.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.shown
            .borrow()
            .iter()
            .filter(|n| n.level == ToastLevel::Error)
            .filter_map(|n| n.command.clone().map(|c| (c, n.message.clone())))
            .collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.shown.borrow().last().map(|n| n.message.clone())
    }

    fn record(&self, message: &str, level: ToastLevel, command: Option<&str>) {
        self.shown.borrow_mut().push(Notification {
            message: message.to_string(),
            level,
            command: command.map(str::to_string),
        });
    }
}

impl Notifier for NotificationCenter {
    fn show(&self, message: &str, level: ToastLevel) {
        tracing::info!(level = level.as_str(), "{message}");
        self.record(message, level, None);
    }

    fn success_for_command(&self, command_id: &str) {
        tracing::debug!(command = %command_id, "command succeeded");
        self.record(command_id, ToastLevel::Success, Some(command_id));
    }

    fn error_for_command(&self, command_id: &str, error: &str) {
        tracing::error!(command = %command_id, error, "command failed");
        self.record(error, ToastLevel::Error, Some(command_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_notifications_are_tagged() {
        let center = NotificationCenter::new();
        center.success_for_command("node.add");
        center.error_for_command("node.remove", "Node 3 not found");
        center.show("hello", ToastLevel::Success);

        assert_eq!(center.successes(), vec!["node.add".to_string()]);
        assert_eq!(
            center.errors(),
            vec![("node.remove".to_string(), "Node 3 not found".to_string())]
        );
        assert_eq!(center.last_message().as_deref(), Some("hello"));
    }

    #[test]
    fn test_take_drains() {
        let center = NotificationCenter::new();
        center.show("a", ToastLevel::Info);
        assert_eq!(center.take().len(), 1);
        assert!(center.notifications().is_empty());
    }
}
