//! The run loop.
//!
//! [`Runtime`] owns the [`BreakController`] and is the only place it is
//! mutated. Ticks, throttled input signals, console commands, the break
//! auto-dismiss timer and shutdown signals are all funnelled into one task
//! through [`Runtime::next_event`]; the resulting [`Effect`]s are carried out
//! against the input source, the break presenter and the lights.
//!
//! Light calls run in detached tasks. Their outcome is only logged and never
//! holds up the timer.

use crate::api::LightController;
use crate::libs::activity::{ActivitySignal, InputSource};
use crate::libs::config::{minutes_to_seconds, Config, TimerConfig};
use crate::libs::controller::{AppState, BreakController, ConfirmSource, Effect, Timestamp};
use crate::libs::formatter::{format_countdown, format_minutes};
use crate::libs::messages::Message;
use crate::libs::presentation::{BreakInfo, BreakPresenter};
use crate::{msg_debug, msg_error, msg_info, msg_print, msg_success, msg_warning};
use anyhow::Result;
use chrono::{TimeDelta, Utc};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};

/// How long shutdown waits for the lights before giving up on them.
const SHUTDOWN_LIGHTS_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the remaining time is printed while monitoring.
const STATUS_LINE_EVERY: TimeDelta = TimeDelta::minutes(1);

/// A console command, one per line on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Confirm(ConfirmSource),
    Reset,
    Toggle,
    /// New break interval in minutes.
    SetInterval(u64),
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let word = words.next().unwrap_or_default().to_string();
        if word == "i" || word == "interval" {
            return match words.next().map(str::parse::<u64>) {
                Some(Ok(minutes)) if minutes > 0 => Command::SetInterval(minutes),
                _ => Command::Unknown(line),
            };
        }
        match word.as_str() {
            "" => Command::Confirm(ConfirmSource::Button),
            "c" | "confirm" => Command::Confirm(ConfirmSource::Shortcut),
            "r" | "reset" => Command::Reset,
            "p" | "pause" | "resume" => Command::Toggle,
            "s" | "status" => Command::Status,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(word),
        }
    }
}

/// Everything the run loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick,
    Activity(ActivitySignal),
    Confirm(ConfirmSource),
    Command(Command),
    Shutdown,
}

pub struct Runtime<A: InputSource, P: BreakPresenter, L: LightController> {
    controller: BreakController,
    config: Config,
    /// Where settings changes are written through to; `None` keeps them in
    /// memory.
    config_path: Option<PathBuf>,
    input: A,
    activity_rx: UnboundedReceiver<ActivitySignal>,
    presenter: P,
    lights: Arc<L>,
    tick: Interval,
    ticking: bool,
    confirm_tx: UnboundedSender<ConfirmSource>,
    confirm_rx: UnboundedReceiver<ConfirmSource>,
    auto_restore: Option<JoinHandle<()>>,
    light_tasks: Vec<JoinHandle<()>>,
    last_status_at: Option<Timestamp>,
}

impl<A: InputSource, P: BreakPresenter, L: LightController> Runtime<A, P, L> {
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config, input: A, activity_rx: UnboundedReceiver<ActivitySignal>, presenter: P, lights: L) -> Self {
        let timer = config.timer();
        let mut tick = time::interval(timer.tick_interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let (confirm_tx, confirm_rx) = mpsc::unbounded_channel();

        Self {
            controller: BreakController::new(timer.settings()),
            config,
            config_path: None,
            input,
            activity_rx,
            presenter,
            lights: Arc::new(lights),
            tick,
            ticking: false,
            confirm_tx,
            confirm_rx,
            auto_restore: None,
            light_tasks: Vec::new(),
            last_status_at: None,
        }
    }

    /// Persist settings changes to `path`.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn controller(&self) -> &BreakController {
        &self.controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn input(&self) -> &A {
        &self.input
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn lights(&self) -> &L {
        &self.lights
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// An auto-dismiss timer is scheduled for the current break.
    pub fn auto_restore_pending(&self) -> bool {
        self.auto_restore.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Leaves the initial `Paused` state. Every launch starts monitoring.
    pub fn launch(&mut self, now: Timestamp) {
        let settings = *self.controller.settings();
        msg_success!(Message::MonitorStarted(format_minutes(&settings.break_interval)));
        msg_print!(Message::CommandHelp);
        let effects = self.controller.enable(now);
        self.apply(effects, now);
    }

    /// Waits for the next thing to react to.
    pub async fn next_event<S>(&mut self, commands: &mut UnboundedReceiver<Command>, shutdown: &mut S) -> Event
    where
        S: Future<Output = ()> + Unpin,
    {
        tokio::select! {
            _ = self.tick.tick() => Event::Tick,
            Some(signal) = self.activity_rx.recv() => Event::Activity(signal),
            Some(source) = self.confirm_rx.recv() => Event::Confirm(source),
            Some(command) = commands.recv() => Event::Command(command),
            _ = shutdown => Event::Shutdown,
        }
    }

    /// Handles one event. Returns false when the loop should end.
    pub fn handle(&mut self, event: Event, now: Timestamp) -> bool {
        match event {
            Event::Tick => self.on_tick(now),
            Event::Activity(signal) => self.controller.record_activity(signal.at),
            Event::Confirm(source) => self.on_confirm(now, source),
            Event::Command(command) => return self.on_command(command, now),
            Event::Shutdown => return false,
        }
        true
    }

    pub fn on_tick(&mut self, now: Timestamp) {
        if !self.ticking {
            return;
        }
        let effects = self.controller.tick(now);
        let entered_break = effects.contains(&Effect::EnterBreak);
        self.apply(effects, now);

        if entered_break || !self.config.timer().show_timer {
            return;
        }
        let due = self.last_status_at.map_or(true, |last| now - last >= STATUS_LINE_EVERY);
        if due {
            self.last_status_at = Some(now);
            msg_print!(Message::NextBreakIn(format_countdown(&self.controller.remaining(now))));
        }
    }

    pub fn on_confirm(&mut self, now: Timestamp, source: ConfirmSource) {
        let effects = self.controller.confirm_break(now, source);
        if effects.is_empty() {
            msg_debug!(format!("Ignoring {} outside of a break", source));
        }
        self.apply(effects, now);
    }

    pub fn on_command(&mut self, command: Command, now: Timestamp) -> bool {
        match command {
            Command::Confirm(source) => self.on_confirm(now, source),
            Command::Reset => {
                let state = self.controller.state();
                let effects = self.controller.reset_timer(now);
                self.apply(effects, now);
                if state == AppState::Monitoring {
                    self.last_status_at = None;
                    msg_info!(Message::TimerReset);
                }
            }
            Command::Toggle => {
                let effects = self.controller.toggle(now);
                self.apply(effects, now);
                if self.controller.state().is_active() {
                    msg_info!(Message::MonitoringResumed);
                } else {
                    msg_info!(Message::MonitoringPaused);
                }
            }
            Command::SetInterval(minutes) => {
                let timer = TimerConfig {
                    break_interval: minutes_to_seconds(minutes),
                    ..self.config.timer()
                };
                self.controller.update_settings(timer.settings());
                msg_success!(Message::BreakIntervalChanged(format_minutes(&self.controller.settings().break_interval)));
                self.config.timer = Some(timer);
                self.persist();
            }
            Command::Status => self.print_status(now),
            Command::Help => msg_print!(Message::CommandHelp),
            Command::Quit => return false,
            Command::Unknown(word) => msg_warning!(Message::UnknownCommand(word)),
        }
        true
    }

    /// Carries out effects in order.
    pub fn apply(&mut self, effects: Vec<Effect>, now: Timestamp) {
        for effect in effects {
            msg_debug!(format!("Effect: {:?}", effect));
            match effect {
                Effect::StartMonitoring => {
                    self.input.start();
                    self.ticking = true;
                    self.last_status_at = None;
                }
                Effect::StopMonitoring => {
                    self.input.stop();
                    self.ticking = false;
                }
                Effect::EnterBreak => self.enter_break(now),
                Effect::ExitBreak => self.exit_break(),
            }
        }
    }

    fn enter_break(&mut self, now: Timestamp) {
        let settings = *self.controller.settings();
        let auto_restore_at = if settings.auto_restore_interval > TimeDelta::zero() {
            now.checked_add_signed(settings.auto_restore_interval)
        } else {
            None
        };
        let info = BreakInfo {
            started_at: now,
            used: self.controller.accumulated_usage(),
            auto_restore_at,
        };
        self.presenter.start(&info);

        let lights = self.lights.clone();
        self.spawn_light_task(async move {
            if let Err(e) = lights.apply_break_state().await {
                msg_warning!(Message::LightsApplyFailed(e.to_string()));
            }
        });

        self.cancel_auto_restore();
        if auto_restore_at.is_some() {
            // An out-of-range interval never fires.
            let delay = settings.auto_restore_interval.to_std().unwrap_or(Duration::MAX);
            let tx = self.confirm_tx.clone();
            self.auto_restore = Some(tokio::spawn(async move {
                time::sleep(delay).await;
                let _ = tx.send(ConfirmSource::AutoTimeout);
            }));
        }
    }

    fn exit_break(&mut self) {
        self.cancel_auto_restore();
        self.presenter.stop();
        let lights = self.lights.clone();
        self.spawn_light_task(async move {
            if let Err(e) = lights.restore().await {
                msg_warning!(Message::LightsRestoreFailed(e.to_string()));
            }
        });
    }

    fn cancel_auto_restore(&mut self) {
        if let Some(handle) = self.auto_restore.take() {
            handle.abort();
        }
    }

    fn spawn_light_task<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.light_tasks.retain(|handle| !handle.is_finished());
        self.light_tasks.push(tokio::spawn(task));
    }

    /// Writes the configuration through to disk.
    fn persist(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            msg_warning!(Message::ConfigSaveFailed(e.to_string()));
        }
    }

    fn print_status(&self, now: Timestamp) {
        let snapshot = self.controller.snapshot(now);
        msg_print!(Message::Status {
            state: snapshot.state.to_string(),
            elapsed: format_countdown(&snapshot.elapsed),
            remaining: format_countdown(&snapshot.remaining),
            idle: snapshot.idle_paused,
        });
    }

    /// Waits for every light call started so far.
    pub async fn settle(&mut self) {
        for handle in self.light_tasks.drain(..) {
            if let Err(e) = handle.await {
                msg_error!(Message::LightsTaskFailed(e.to_string()));
            }
        }
    }

    /// Stops input, hides the prompt and puts the lights back if a break is
    /// in progress. Lights get [`SHUTDOWN_LIGHTS_TIMEOUT`] to answer.
    pub async fn shutdown(&mut self) {
        msg_info!(Message::ShuttingDown);
        self.cancel_auto_restore();
        self.input.stop();
        self.ticking = false;

        let in_break = self.controller.state() == AppState::BreakTime;
        if in_break {
            self.presenter.stop();
        }

        let lights = self.lights.clone();
        let finish = async {
            self.settle().await;
            if in_break {
                if let Err(e) = lights.restore().await {
                    msg_warning!(Message::LightsRestoreFailed(e.to_string()));
                }
            }
        };
        if time::timeout(SHUTDOWN_LIGHTS_TIMEOUT, finish).await.is_err() {
            msg_warning!(Message::LightsShutdownTimeout);
        }
    }

    /// Runs until `q`, end of a shutdown signal, or Ctrl-C.
    pub async fn run(mut self, mut commands: UnboundedReceiver<Command>) -> Result<()> {
        let mut shutdown = std::pin::pin!(shutdown_signal());
        self.launch(Utc::now());

        loop {
            let event = self.next_event(&mut commands, &mut shutdown).await;
            if !self.handle(event, Utc::now()) {
                break;
            }
        }

        self.shutdown().await;
        Ok(())
    }
}

/// Reads console commands from stdin on a background task.
///
/// The channel closes at end of input; the loop keeps running without
/// console commands in that case.
pub fn spawn_command_reader() -> UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Command::parse(&line)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    msg_debug!(format!("Console input closed: {}", e));
                    break;
                }
            }
        }
    });
    rx
}

/// Resolves on SIGINT/SIGTERM (Unix) or Ctrl-C (elsewhere).
///
/// If the handlers cannot be installed the future never resolves and the
/// user quits with `q`.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                msg_error!(Message::SignalHandlerFailed(e.to_string()));
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => msg_info!(Message::ReceivedSigterm),
            _ = sigint.recv() => msg_info!(Message::ReceivedSigint),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => msg_info!(Message::ReceivedCtrlC),
            Err(e) => {
                msg_error!(Message::SignalHandlerFailed(e.to_string()));
                std::future::pending::<()>().await;
            }
        }
    }
}
