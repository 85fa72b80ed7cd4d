#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeDelta, TimeZone, Utc};
    use parking_lot::Mutex;
    use std::future::pending;
    use std::pin::pin;
    use teumnirm::api::LightController;
    use teumnirm::libs::activity::{ActivitySignal, InputSource};
    use teumnirm::libs::config::{Config, TimerConfig, CONFIG_FILE_NAME};
    use teumnirm::libs::controller::{AppState, ConfirmSource, Timestamp};
    use teumnirm::libs::presentation::{BreakInfo, BreakPresenter};
    use teumnirm::libs::runtime::{Command, Event, Runtime};
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

    #[derive(Debug, Default)]
    struct RecordingInput {
        running: bool,
        starts: usize,
        stops: usize,
    }

    impl InputSource for RecordingInput {
        fn start(&mut self) {
            self.running = true;
            self.starts += 1;
        }

        fn stop(&mut self) {
            self.running = false;
            self.stops += 1;
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPresenter {
        current: Option<BreakInfo>,
        shown: usize,
        hidden: usize,
    }

    impl BreakPresenter for RecordingPresenter {
        fn start(&mut self, info: &BreakInfo) {
            if self.current.is_none() {
                self.shown += 1;
                self.current = Some(info.clone());
            }
        }

        fn stop(&mut self) {
            if self.current.take().is_some() {
                self.hidden += 1;
            }
        }

        fn is_showing(&self) -> bool {
            self.current.is_some()
        }
    }

    #[derive(Debug, Default)]
    struct RecordingLights {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingLights {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl LightController for RecordingLights {
        async fn apply_break_state(&self) -> Result<()> {
            self.calls.lock().push("apply");
            Ok(())
        }

        async fn restore(&self) -> Result<()> {
            self.calls.lock().push("restore");
            Ok(())
        }
    }

    type TestRuntime = Runtime<RecordingInput, RecordingPresenter, RecordingLights>;

    struct RuntimeTestContext {
        temp_dir: TempDir,
    }

    impl AsyncTestContext for RuntimeTestContext {
        async fn setup() -> Self {
            RuntimeTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> Timestamp {
        t0() + TimeDelta::seconds(seconds)
    }

    /// One minute interval, auto-dismiss after five.
    fn short_timer() -> TimerConfig {
        TimerConfig {
            break_interval: 60,
            idle_threshold: 180,
            idle_reset_ratio: 1.0,
            auto_restore_interval: 300,
            show_timer: false,
            ..TimerConfig::default()
        }
    }

    fn runtime_with(config: Config) -> (TestRuntime, UnboundedSender<ActivitySignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Runtime::new(config, RecordingInput::default(), rx, RecordingPresenter::default(), RecordingLights::default());
        (runtime, tx)
    }

    fn runtime() -> (TestRuntime, UnboundedSender<ActivitySignal>) {
        runtime_with(Config {
            timer: Some(short_timer()),
            hue: None,
        })
    }

    /// Feeds activity and a tick every second until the break starts.
    fn use_until_break(rt: &mut TestRuntime, from: i64) -> i64 {
        for second in from..from + 1000 {
            assert!(rt.handle(Event::Activity(ActivitySignal { at: at(second) }), at(second)));
            assert!(rt.handle(Event::Tick, at(second)));
            if rt.controller().state() == AppState::BreakTime {
                return second;
            }
        }
        panic!("break never started");
    }

    /// Waits for up to `ticks` ticks of the (paused) clock. Returns early with
    /// the first confirmation that arrives.
    async fn run_ticks(rt: &mut TestRuntime, commands: &mut UnboundedReceiver<Command>, ticks: usize) -> Option<ConfirmSource> {
        let mut shutdown = pin!(pending::<()>());
        let mut seen = 0;
        while seen < ticks {
            match rt.next_event(commands, &mut shutdown).await {
                Event::Confirm(source) => return Some(source),
                Event::Tick => seen += 1,
                other => {
                    rt.handle(other, t0());
                }
            }
        }
        None
    }

    #[tokio::test]
    async fn test_launch_starts_monitoring() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());

        assert_eq!(rt.controller().state(), AppState::Monitoring);
        assert!(rt.input().is_running());
        assert_eq!(rt.input().starts, 1);
        assert!(rt.is_ticking());
    }

    #[test_context(RuntimeTestContext)]
    #[tokio::test]
    async fn test_launch_monitors_after_quitting_paused(ctx: &mut RuntimeTestContext) {
        let path = ctx.temp_dir.path().join(CONFIG_FILE_NAME);
        let (rt, _activity) = runtime();
        let mut rt = rt.with_config_path(path.clone());
        rt.launch(t0());

        assert!(rt.handle(Event::Command(Command::Toggle), at(10)));
        assert_eq!(rt.controller().state(), AppState::Paused);
        assert!(!rt.is_ticking());
        assert!(rt.handle(Event::Tick, at(600)));
        assert_eq!(rt.controller().state(), AppState::Paused);
        assert!(!rt.handle(Event::Command(Command::Quit), at(601)));

        // Pausing is not written through, so the next run starts monitoring.
        let (mut next, _activity) = runtime_with(Config::read_from(&path).unwrap());
        next.launch(at(700));
        assert_eq!(next.controller().state(), AppState::Monitoring);
        assert_eq!(next.input().starts, 1);
        assert!(next.is_ticking());
        assert_eq!(next.controller().elapsed(at(700)), TimeDelta::zero());
    }

    #[tokio::test]
    async fn test_break_shows_prompt_and_turns_lights_red() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());

        let broke_at = use_until_break(&mut rt, 0);
        assert_eq!(broke_at, 60);

        let presenter = rt.presenter();
        assert_eq!(presenter.shown, 1);
        let info = presenter.current.clone().unwrap();
        assert_eq!(info.started_at, at(60));
        assert_eq!(info.used, TimeDelta::seconds(60));
        assert_eq!(info.auto_restore_at, Some(at(360)));

        assert!(!rt.input().is_running());
        assert_eq!(rt.input().stops, 1);
        assert!(!rt.is_ticking());
        assert!(rt.auto_restore_pending());

        rt.settle().await;
        assert_eq!(rt.lights().calls(), vec!["apply"]);
    }

    #[tokio::test]
    async fn test_confirm_ends_break_once() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());
        let broke_at = use_until_break(&mut rt, 0);

        assert!(rt.handle(Event::Command(Command::parse("")), at(broke_at + 10)));
        assert!(rt.handle(Event::Command(Command::parse("c")), at(broke_at + 10)));
        rt.settle().await;

        assert_eq!(rt.controller().state(), AppState::Monitoring);
        assert_eq!(rt.presenter().hidden, 1);
        assert!(!rt.presenter().is_showing());
        assert!(rt.input().is_running());
        assert_eq!(rt.input().starts, 2);
        assert!(rt.is_ticking());
        assert!(!rt.auto_restore_pending());
        assert_eq!(rt.lights().calls(), vec!["apply", "restore"]);
        assert_eq!(rt.controller().elapsed(at(broke_at + 10)), TimeDelta::zero());
    }

    #[test_context(RuntimeTestContext)]
    #[tokio::test]
    async fn test_pause_during_break_exits_break_once(ctx: &mut RuntimeTestContext) {
        let path = ctx.temp_dir.path().join(CONFIG_FILE_NAME);
        let (rt, _activity) = runtime();
        let mut rt = rt.with_config_path(path.clone());
        rt.launch(t0());
        let broke_at = use_until_break(&mut rt, 0);

        assert!(rt.handle(Event::Command(Command::parse("p")), at(broke_at + 1)));
        rt.settle().await;

        assert_eq!(rt.controller().state(), AppState::Paused);
        assert_eq!(rt.presenter().hidden, 1);
        assert!(!rt.input().is_running());
        assert!(!rt.is_ticking());
        assert_eq!(rt.lights().calls(), vec!["apply", "restore"]);
        assert!(!path.exists());

        assert!(rt.handle(Event::Command(Command::parse("p")), at(broke_at + 30)));
        assert_eq!(rt.controller().state(), AppState::Monitoring);
        assert_eq!(rt.controller().elapsed(at(broke_at + 30)), TimeDelta::zero());
        assert!(!path.exists());
    }

    #[test_context(RuntimeTestContext)]
    #[tokio::test]
    async fn test_interval_change_applies_and_persists(ctx: &mut RuntimeTestContext) {
        let path = ctx.temp_dir.path().join(CONFIG_FILE_NAME);
        let (rt, _activity) = runtime();
        let mut rt = rt.with_config_path(path.clone());
        rt.launch(t0());

        assert!(rt.handle(Event::Command(Command::parse("i 2")), at(0)));
        assert_eq!(rt.controller().settings().break_interval, TimeDelta::minutes(2));
        assert_eq!(Config::read_from(&path).unwrap().timer().break_interval, 120);

        // The reset threshold scales with the interval, so activity keeps it alive.
        assert_eq!(use_until_break(&mut rt, 0), 120);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_restore_ends_break() {
        let (mut rt, _activity) = runtime();
        let (_commands_tx, mut commands) = mpsc::unbounded_channel();
        rt.launch(t0());
        let broke_at = use_until_break(&mut rt, 0);

        let source = run_ticks(&mut rt, &mut commands, 1000).await;
        assert_eq!(source, Some(ConfirmSource::AutoTimeout));

        assert!(rt.handle(Event::Confirm(ConfirmSource::AutoTimeout), at(broke_at + 300)));
        rt.settle().await;
        assert_eq!(rt.controller().state(), AppState::Monitoring);
        assert_eq!(rt.presenter().hidden, 1);
        assert_eq!(rt.lights().calls(), vec!["apply", "restore"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_auto_restore_does_not_end_next_break() {
        let (mut rt, _activity) = runtime();
        let (_commands_tx, mut commands) = mpsc::unbounded_channel();
        rt.launch(t0());

        let first = use_until_break(&mut rt, 0);
        assert_eq!(run_ticks(&mut rt, &mut commands, 200).await, None);
        rt.handle(Event::Command(Command::Confirm(ConfirmSource::Button)), at(first + 200));

        let second = use_until_break(&mut rt, first + 200);
        // Past the first break's deadline, short of the second's.
        assert_eq!(run_ticks(&mut rt, &mut commands, 200).await, None);
        assert_eq!(rt.controller().state(), AppState::BreakTime);

        assert_eq!(run_ticks(&mut rt, &mut commands, 200).await, Some(ConfirmSource::AutoTimeout));
        rt.handle(Event::Confirm(ConfirmSource::AutoTimeout), at(second + 300));
        assert_eq!(rt.controller().state(), AppState::Monitoring);
    }

    #[tokio::test]
    async fn test_shutdown_during_break_restores_lights() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());
        let broke_at = use_until_break(&mut rt, 0);

        assert!(!rt.handle(Event::Command(Command::Quit), at(broke_at + 5)));
        rt.shutdown().await;

        assert!(!rt.presenter().is_showing());
        assert!(!rt.auto_restore_pending());
        assert_eq!(rt.lights().calls(), vec!["apply", "restore"]);
    }

    #[tokio::test]
    async fn test_shutdown_while_monitoring_leaves_lights_alone() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());

        assert!(!rt.handle(Event::Shutdown, at(10)));
        rt.shutdown().await;

        assert!(!rt.input().is_running());
        assert!(rt.lights().calls().is_empty());
    }

    #[tokio::test]
    async fn test_console_commands_keep_running() {
        let (mut rt, _activity) = runtime();
        rt.launch(t0());
        rt.handle(Event::Activity(ActivitySignal { at: at(20) }), at(20));

        assert!(rt.handle(Event::Command(Command::parse("r")), at(30)));
        assert_eq!(rt.controller().elapsed(at(30)), TimeDelta::zero());
        assert!(rt.handle(Event::Command(Command::parse("s")), at(31)));
        assert!(rt.handle(Event::Command(Command::parse("h")), at(32)));
        assert!(rt.handle(Event::Command(Command::parse("xyzzy")), at(33)));
        assert_eq!(rt.controller().state(), AppState::Monitoring);
    }
}
