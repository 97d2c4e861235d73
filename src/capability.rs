//! Shared state and notice plumbing for host capabilities.
//!
//! Both the camera and the location probe follow the same shape: a request is
//! issued, the capability is pending until the host answers, and the answer
//! lands either as a value or as a user-facing error message. Failures are
//! never thrown at the caller; they are recorded here and announced through a
//! [`Notifier`].

use std::sync::{Arc, Mutex};

/// Resting/transient state of a one-shot capability request.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityState<T> {
    /// Last successfully acquired value
    pub value: Option<T>,
    /// User-facing message of the last failure
    pub error: Option<String>,
    /// True strictly between a request and its resolution
    pub pending: bool,
}

impl<T> Default for CapabilityState<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            pending: false,
        }
    }
}

impl<T> CapabilityState<T> {
    /// Mark a request as issued. Returns false if one is already pending.
    pub fn begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.error = None;
        true
    }

    /// Record a successful resolution, clearing any previous error.
    pub fn resolve(&mut self, value: T) {
        self.value = Some(value);
        self.error = None;
        self.pending = false;
    }

    /// Record a failed resolution.
    ///
    /// The previously acquired value is left in place.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.pending = false;
    }

    /// Clear the pending flag without recording an outcome.
    pub fn abandon(&mut self) {
        self.pending = false;
    }
}

/// How a notice is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Blocking alert shown at the moment of failure
    Alert,
    /// Inline text next to the control that triggered the request
    Inline,
}

/// A user-facing message raised by a capability or screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Alert,
            message: message.into(),
        }
    }

    pub fn inline(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Inline,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Alert => log::warn!("alert: {}", notice.message),
            NoticeKind::Inline => log::info!("notice: {}", notice.message),
        }
    }
}

/// Shared, clonable collection of notices.
///
/// A screen hands clones of the same board to every component it owns and
/// renders whatever has been posted.
#[derive(Debug, Default, Clone)]
pub struct NoticeBoard {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices posted so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Most recent notice, if any.
    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().ok()?.last().cloned()
    }

    /// Remove and return all posted notices.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        LogNotifier.notify(notice.clone());
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_is_rejected_while_pending() {
        let mut state: CapabilityState<u32> = CapabilityState::default();
        assert!(state.begin());
        assert!(state.pending);
        assert!(!state.begin());
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut state: CapabilityState<u32> = CapabilityState::default();
        state.fail("boom");
        assert!(state.begin());
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_fail_keeps_previous_value() {
        let mut state = CapabilityState::default();
        state.begin();
        state.resolve(7);
        state.begin();
        state.fail("denied");
        assert_eq!(state.value, Some(7));
        assert_eq!(state.error.as_deref(), Some("denied"));
        assert!(!state.pending);
    }

    #[test]
    fn test_abandon_only_clears_pending() {
        let mut state = CapabilityState::default();
        state.resolve(1);
        state.begin();
        state.abandon();
        assert!(!state.pending);
        assert_eq!(state.value, Some(1));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_notice_board_is_shared_between_clones() {
        let board = NoticeBoard::new();
        let handle = board.clone();
        handle.notify(Notice::alert("camera"));
        handle.notify(Notice::inline("location"));

        assert_eq!(board.notices().len(), 2);
        assert_eq!(board.last(), Some(Notice::inline("location")));
        assert_eq!(board.drain().len(), 2);
        assert!(board.notices().is_empty());
    }
}
