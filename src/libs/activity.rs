//! Keyboard and mouse activity source.
//!
//! A single `rdev` listener thread is started lazily the first time the source
//! is started; `rdev::listen` blocks forever and cannot be stopped, so
//! [`ActivitySource::stop`] only closes a gate and events are dropped until the
//! next [`ActivitySource::start`].
//!
//! Events are throttled before they leave the listener thread: at most one
//! [`ActivitySignal`] per `activity_throttle` reaches the run loop.

use crate::libs::controller::Timestamp;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info};
use chrono::Utc;
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// "The user touched an input device at `at`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySignal {
    pub at: Timestamp,
}

/// Something that produces [`ActivitySignal`]s while started.
pub trait InputSource {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Lets an event through at most once per `min_gap`.
#[derive(Debug)]
pub struct Throttle {
    min_gap: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last: Mutex::new(None),
        }
    }

    /// Returns true and remembers `now` if the previous admitted event is at
    /// least `min_gap` old.
    pub fn admit(&self, now: Instant) -> bool {
        let mut last = self.last.lock();
        match *last {
            Some(previous) if now.saturating_duration_since(previous) < self.min_gap => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

/// Whether an input event counts as user activity.
pub fn is_activity(event_type: &EventType) -> bool {
    matches!(
        event_type,
        EventType::KeyPress(_)
            | EventType::KeyRelease(_)
            | EventType::ButtonPress(_)
            | EventType::ButtonRelease(_)
            | EventType::MouseMove { .. }
            | EventType::Wheel { .. }
    )
}

/// State shared between the listener thread and the run loop.
#[derive(Debug)]
pub struct ActivityFilter {
    open: AtomicBool,
    failed: AtomicBool,
    throttle: Throttle,
    tx: UnboundedSender<ActivitySignal>,
}

impl ActivityFilter {
    pub fn new(throttle: Duration, tx: UnboundedSender<ActivitySignal>) -> Self {
        Self {
            open: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            throttle: Throttle::new(throttle),
            tx,
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Forwards one event if the gate is open and the throttle admits it.
    /// Returns whether a signal was sent.
    pub fn forward(&self, event_type: &EventType, now: Instant) -> bool {
        if !self.is_open() || !is_activity(event_type) || !self.throttle.admit(now) {
            return false;
        }
        // The receiver is gone only while the process is shutting down.
        self.tx.send(ActivitySignal { at: Utc::now() }).is_ok()
    }

    /// Records a listener failure. Only the first one is reported.
    fn fail(&self, reason: String) {
        if self.failed.swap(true, Ordering::SeqCst) {
            return;
        }
        msg_error!(Message::ActivityListenerFailed(reason));
        msg_info!(Message::InputPermissionHint);
    }
}

/// Global input listener feeding the run loop.
#[derive(Debug)]
pub struct ActivitySource {
    filter: Arc<ActivityFilter>,
    listener_started: bool,
}

impl ActivitySource {
    /// Creates the source and the receiving end of its signal channel.
    pub fn new(throttle: Duration) -> (Self, UnboundedReceiver<ActivitySignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            filter: Arc::new(ActivityFilter::new(throttle, tx)),
            listener_started: false,
        };
        (source, rx)
    }

    fn spawn_listener(&mut self) {
        self.listener_started = true;
        let filter = self.filter.clone();
        let spawned = std::thread::Builder::new().name("teumnirm-input".into()).spawn(move || {
            let callback_filter = filter.clone();
            let result = listen(move |event: Event| {
                callback_filter.forward(&event.event_type, Instant::now());
            });
            // `listen` only returns when the platform refused to deliver events.
            let reason = match result {
                Ok(()) => "listener exited".to_string(),
                Err(e) => format!("{:?}", e),
            };
            filter.fail(reason);
        });
        if let Err(e) = spawned {
            self.filter.fail(e.to_string());
        }
    }
}

impl InputSource for ActivitySource {
    fn start(&mut self) {
        if !self.listener_started {
            self.spawn_listener();
        }
        if self.filter.has_failed() {
            return;
        }
        msg_debug!("Activity source started");
        self.filter.set_open(true);
    }

    fn stop(&mut self) {
        msg_debug!("Activity source stopped");
        self.filter.set_open(false);
    }

    fn is_running(&self) -> bool {
        self.filter.is_open()
    }
}
