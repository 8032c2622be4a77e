//! The notification sink boundary.
//!
//! The core never renders anything itself; user-facing outcomes are pushed
//! through a [`Notifier`] as fire-and-forget toasts. Nothing in the core
//! consumes a return value from the sink.

/// How prominently a notification should be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A single transient message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Shorthand for a success toast.
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, description)
    }
}

/// Displays transient messages to the user.
///
/// Implementations must not block; the core calls this from async contexts
/// and ignores whatever the sink does with the message.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// A sink that drops every notification. Useful for headless flows.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _notification: Notification) {}
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Records every notification for later assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Vec<Notification>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notification: Notification) {
            self.sent.push(notification);
        }
    }
}
