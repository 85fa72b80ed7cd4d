//! Usage/break timing controller.
//!
//! The controller is the only stateful policy in the application. It tracks how
//! long the user has been continuously active, suspends the count while they
//! are briefly idle, throws the count away after a long absence and decides
//! when a break starts and ends.
//!
//! ## State Machine
//!
//! ```text
//!            enable                    elapsed >= break_interval
//!  Paused ───────────▶ Monitoring ─────────────────────────────▶ BreakTime
//!    ▲                   │   ▲                                      │
//!    │      disable      │   │         confirm / auto-timeout       │
//!    └───────────────────┘   └──────────────────────────────────────┘
//!    ▲                                                               │
//!    └──────────────── disable (exit-break effects first) ──────────┘
//! ```
//!
//! ## Purity
//!
//! Every operation takes the current time as an argument and returns the
//! [`Effect`]s the caller has to perform. The controller never reads the clock,
//! never talks to the presentation layer or the lights itself, which keeps it
//! deterministic under test.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeDelta, Utc};
//! use teumnirm::libs::controller::{AppState, BreakController, Effect, TimerSettings};
//!
//! let mut controller = BreakController::new(TimerSettings::default());
//! let now = Utc::now();
//! assert_eq!(controller.enable(now), vec![Effect::StartMonitoring]);
//! assert_eq!(controller.state(), AppState::Monitoring);
//! assert_eq!(controller.elapsed(now), TimeDelta::zero());
//! ```

use crate::msg_debug;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;

pub type Timestamp = DateTime<Utc>;

/// Top-level application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Active usage accrues toward the next break.
    Monitoring,
    /// The user is being asked to take a break; nothing accrues.
    BreakTime,
    /// Monitoring is switched off by the user.
    Paused,
}

impl AppState {
    /// Whether the reminder is switched on (monitoring or currently on a break).
    pub fn is_active(&self) -> bool {
        match self {
            AppState::Monitoring | AppState::BreakTime => true,
            AppState::Paused => false,
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AppState::Monitoring => "monitoring",
            AppState::BreakTime => "break time",
            AppState::Paused => "paused",
        };
        write!(f, "{}", text)
    }
}

/// What caused a break to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmSource {
    /// The confirm button of the break prompt (Enter on the console).
    Button,
    /// The menu shortcut.
    Shortcut,
    /// The prompt expired after `auto_restore_interval`.
    AutoTimeout,
    /// "Reset timer" pressed during a break.
    Reset,
    /// Monitoring switched off during a break.
    Disable,
}

impl fmt::Display for ConfirmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConfirmSource::Button => "confirm button",
            ConfirmSource::Shortcut => "shortcut",
            ConfirmSource::AutoTimeout => "auto-timeout",
            ConfirmSource::Reset => "timer reset",
            ConfirmSource::Disable => "monitoring disabled",
        };
        write!(f, "{}", text)
    }
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start the activity source and the periodic tick.
    StartMonitoring,
    /// Stop the activity source and the periodic tick.
    StopMonitoring,
    /// Show the break prompt and switch the lights to the break color.
    EnterBreak,
    /// Hide the break prompt and put the lights back.
    ExitBreak,
}

/// Timing configuration consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSettings {
    /// Continuous usage after which a break is due.
    pub break_interval: TimeDelta,
    /// Idle time after which the open usage span is suspended.
    pub idle_threshold: TimeDelta,
    /// Fraction of `break_interval` of idleness that discards accrued usage.
    pub idle_reset_ratio: f64,
    /// How long the break prompt stays up before it dismisses itself.
    pub auto_restore_interval: TimeDelta,
}

impl TimerSettings {
    /// Idle time at which accrued usage is discarded instead of suspended.
    pub fn idle_reset_threshold(&self) -> TimeDelta {
        let ratio = self.idle_reset_ratio.clamp(0.0, 1.0);
        let millis = (self.break_interval.num_milliseconds() as f64 * ratio).round() as i64;
        TimeDelta::milliseconds(millis)
    }
}

impl Default for TimerSettings {
    /// 55 minute interval, 3 minute idle pause, reset after half the interval,
    /// 5 minute auto-dismiss.
    fn default() -> Self {
        Self {
            break_interval: TimeDelta::minutes(55),
            idle_threshold: TimeDelta::minutes(3),
            idle_reset_ratio: 0.5,
            auto_restore_interval: TimeDelta::minutes(5),
        }
    }
}

/// Point-in-time view for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: AppState,
    #[serde(serialize_with = "serialize_seconds")]
    pub elapsed: TimeDelta,
    #[serde(serialize_with = "serialize_seconds")]
    pub remaining: TimeDelta,
    pub idle_paused: bool,
}

fn serialize_seconds<S: serde::Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_seconds())
}

/// The usage/idle/break state machine.
#[derive(Debug, Clone)]
pub struct BreakController {
    state: AppState,
    settings: TimerSettings,
    /// Usage folded in at transition boundaries; excludes the open span.
    accumulated_usage: TimeDelta,
    /// Start of the open span. `None` outside of `Monitoring`.
    resume_time: Option<Timestamp>,
    /// The open span is suspended because the user went idle.
    is_paused: bool,
    last_activity_time: Option<Timestamp>,
}

impl BreakController {
    /// Creates a controller in the pre-launch `Paused` state.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            state: AppState::Paused,
            settings,
            accumulated_usage: TimeDelta::zero(),
            resume_time: None,
            is_paused: false,
            last_activity_time: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn accumulated_usage(&self) -> TimeDelta {
        self.accumulated_usage
    }

    pub fn is_idle_paused(&self) -> bool {
        self.is_paused
    }

    pub fn last_activity_time(&self) -> Option<Timestamp> {
        self.last_activity_time
    }

    /// Replaces the timing configuration. Takes effect from the next tick.
    pub fn update_settings(&mut self, settings: TimerSettings) {
        msg_debug!(format!("Timer settings updated: {:?}", settings));
        self.settings = settings;
    }

    /// `Paused → Monitoring`. No-op in any other state.
    pub fn enable(&mut self, now: Timestamp) -> Vec<Effect> {
        if self.state != AppState::Paused {
            return Vec::new();
        }
        self.reset_accrual(now);
        self.transition(AppState::Monitoring);
        vec![Effect::StartMonitoring]
    }

    /// `Monitoring → Paused`, or `BreakTime → Paused` with the exit-break
    /// effects performed once on the way.
    pub fn disable(&mut self, now: Timestamp) -> Vec<Effect> {
        match self.state {
            AppState::Paused => Vec::new(),
            AppState::Monitoring => {
                self.accumulated_usage = self.elapsed(now);
                self.resume_time = None;
                self.is_paused = false;
                self.transition(AppState::Paused);
                vec![Effect::StopMonitoring]
            }
            AppState::BreakTime => {
                // Leaving the break resets accrual exactly as a confirmation
                // would, but nothing restarts.
                self.reset_accrual(now);
                self.resume_time = None;
                self.transition(AppState::Paused);
                msg_debug!(format!("Break ended by {}", ConfirmSource::Disable));
                vec![Effect::ExitBreak, Effect::StopMonitoring]
            }
        }
    }

    /// Flips between `Paused` and the active states.
    pub fn toggle(&mut self, now: Timestamp) -> Vec<Effect> {
        if self.state == AppState::Paused {
            self.enable(now)
        } else {
            self.disable(now)
        }
    }

    /// Periodic bookkeeping. Applies the idle policy and enters the break once
    /// the interval is used up.
    pub fn tick(&mut self, now: Timestamp) -> Vec<Effect> {
        if self.state != AppState::Monitoring {
            return Vec::new();
        }

        let idle = self.idle_time(now);

        if idle >= self.settings.idle_reset_threshold() {
            if !(self.is_paused && self.accumulated_usage.is_zero()) {
                msg_debug!(format!("Idle for {}s, discarding accrued usage", idle.num_seconds()));
                self.accumulated_usage = TimeDelta::zero();
                self.is_paused = true;
                self.resume_time = Some(now);
            }
        } else if !self.is_paused && idle >= self.settings.idle_threshold {
            msg_debug!(format!("Idle for {}s, suspending usage timer", idle.num_seconds()));
            self.accumulated_usage = self.accumulated_usage + self.open_span(now);
            self.is_paused = true;
            self.resume_time = Some(now);
        }

        if self.elapsed(now) >= self.settings.break_interval {
            return self.enter_break(now);
        }

        Vec::new()
    }

    /// Registers an (already throttled) input event. Ignored unless monitoring.
    pub fn record_activity(&mut self, now: Timestamp) {
        if self.state != AppState::Monitoring {
            return;
        }
        if self.is_paused {
            msg_debug!("Activity detected, resuming usage timer");
            self.is_paused = false;
            self.resume_time = Some(now);
        }
        self.last_activity_time = Some(now);
    }

    /// Ends the current break. Only meaningful in `BreakTime`; repeated calls
    /// after the first are no-ops, whatever their source.
    pub fn confirm_break(&mut self, now: Timestamp, source: ConfirmSource) -> Vec<Effect> {
        if self.state != AppState::BreakTime {
            return Vec::new();
        }
        msg_debug!(format!("Break ended by {}", source));
        self.reset_accrual(now);
        self.transition(AppState::Monitoring);
        vec![Effect::ExitBreak, Effect::StartMonitoring]
    }

    /// Restarts the interval while monitoring; ends the break while on one.
    pub fn reset_timer(&mut self, now: Timestamp) -> Vec<Effect> {
        match self.state {
            AppState::Monitoring => {
                self.reset_accrual(now);
                msg_debug!("Usage timer reset");
                Vec::new()
            }
            AppState::BreakTime => self.confirm_break(now, ConfirmSource::Reset),
            AppState::Paused => Vec::new(),
        }
    }

    /// Usage counted toward the current interval.
    pub fn elapsed(&self, now: Timestamp) -> TimeDelta {
        if self.state == AppState::Monitoring && !self.is_paused {
            self.accumulated_usage + self.open_span(now)
        } else {
            self.accumulated_usage
        }
    }

    /// Time left until the break; never negative. Zero while on a break,
    /// frozen at the disable point while `Paused`.
    pub fn remaining(&self, now: Timestamp) -> TimeDelta {
        if self.state == AppState::BreakTime {
            return TimeDelta::zero();
        }
        (self.settings.break_interval - self.elapsed(now)).max(TimeDelta::zero())
    }

    pub fn snapshot(&self, now: Timestamp) -> Snapshot {
        Snapshot {
            state: self.state,
            elapsed: self.elapsed(now),
            remaining: self.remaining(now),
            idle_paused: self.is_paused,
        }
    }

    fn enter_break(&mut self, now: Timestamp) -> Vec<Effect> {
        self.accumulated_usage = self.elapsed(now);
        self.resume_time = None;
        self.is_paused = false;
        self.transition(AppState::BreakTime);
        vec![Effect::StopMonitoring, Effect::EnterBreak]
    }

    fn reset_accrual(&mut self, now: Timestamp) {
        self.accumulated_usage = TimeDelta::zero();
        self.resume_time = Some(now);
        self.is_paused = false;
        self.last_activity_time = Some(now);
    }

    fn open_span(&self, now: Timestamp) -> TimeDelta {
        self.resume_time
            .map(|start| (now - start).max(TimeDelta::zero()))
            .unwrap_or_else(TimeDelta::zero)
    }

    fn idle_time(&self, now: Timestamp) -> TimeDelta {
        self.last_activity_time
            .map(|last| (now - last).max(TimeDelta::zero()))
            .unwrap_or_else(TimeDelta::zero)
    }

    fn transition(&mut self, next: AppState) {
        msg_debug!(format!("State: {:?} -> {:?}", self.state, next));
        self.state = next;
    }
}
