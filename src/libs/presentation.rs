//! Break prompt.
//!
//! The run loop tells a [`BreakPresenter`] when a break starts and ends. The
//! user confirms on the console; the presenter itself never ends a break.

use crate::libs::controller::Timestamp;
use crate::libs::formatter::{format_clock, format_countdown, format_minutes};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_print, msg_warning};
use chrono::TimeDelta;
use notify_rust::Notification;

/// What the prompt needs to know about the break being shown.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakInfo {
    pub started_at: Timestamp,
    /// Usage that led to this break.
    pub used: TimeDelta,
    /// When the prompt dismisses itself; `None` if it never does.
    pub auto_restore_at: Option<Timestamp>,
}

impl BreakInfo {
    pub fn auto_restore_in(&self, now: Timestamp) -> Option<TimeDelta> {
        self.auto_restore_at.map(|at| (at - now).max(TimeDelta::zero()))
    }
}

pub trait BreakPresenter {
    /// Shows the prompt. Showing an already visible prompt does nothing.
    fn start(&mut self, info: &BreakInfo);
    /// Hides the prompt if it is visible.
    fn stop(&mut self);
    fn is_showing(&self) -> bool;
}

/// Terminal banner plus an optional desktop notification.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    notifications: bool,
    current: Option<BreakInfo>,
}

impl ConsolePresenter {
    pub fn new(notifications: bool) -> Self {
        Self {
            notifications,
            current: None,
        }
    }

    fn notify(&self, info: &BreakInfo) {
        let body = match info.auto_restore_in(info.started_at) {
            Some(left) => format!("{}\n{}", Message::BreakHint, Message::AutoDismissIn(format_countdown(&left))),
            None => Message::BreakHint.to_string(),
        };
        let shown = Notification::new()
            .summary(&Message::BreakTitle.to_string())
            .body(&body)
            .appname("teumnirm")
            .show();
        if let Err(e) = shown {
            msg_warning!(Message::NotificationFailed(e.to_string()));
        }
    }
}

impl BreakPresenter for ConsolePresenter {
    fn start(&mut self, info: &BreakInfo) {
        if self.current.is_some() {
            msg_debug!("Break prompt already visible");
            return;
        }
        msg_print!(Message::BreakTitle, true);
        msg_print!(Message::BreakStarted {
            at: format_clock(&info.started_at),
            used: format_minutes(&info.used),
        });
        msg_print!(Message::BreakHint);
        if let Some(at) = info.auto_restore_at {
            msg_print!(Message::AutoDismissAt(format_clock(&at)));
        }
        msg_print!(Message::BreakConfirmHint);
        if self.notifications {
            self.notify(info);
        }
        self.current = Some(info.clone());
    }

    fn stop(&mut self) {
        if self.current.take().is_some() {
            msg_print!(Message::BreakEnded);
        }
    }

    fn is_showing(&self) -> bool {
        self.current.is_some()
    }
}
