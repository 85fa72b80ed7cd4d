#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use teumnirm::libs::controller::{AppState, BreakController, ConfirmSource, Effect, Timestamp, TimerSettings};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> Timestamp {
        t0() + TimeDelta::seconds(seconds)
    }

    fn settings(break_interval: i64, idle_threshold: i64, idle_reset_ratio: f64) -> TimerSettings {
        TimerSettings {
            break_interval: TimeDelta::seconds(break_interval),
            idle_threshold: TimeDelta::seconds(idle_threshold),
            idle_reset_ratio,
            auto_restore_interval: TimeDelta::minutes(5),
        }
    }

    fn monitoring(settings: TimerSettings) -> BreakController {
        let mut controller = BreakController::new(settings);
        assert_eq!(controller.enable(t0()), vec![Effect::StartMonitoring]);
        controller
    }

    /// Activity and a tick every second until the break starts.
    fn use_until_break(controller: &mut BreakController, from: i64) -> i64 {
        for second in from.. {
            controller.record_activity(at(second));
            if controller.tick(at(second)).contains(&Effect::EnterBreak) {
                return second;
            }
            assert!(second < from + 100_000, "break never started");
        }
        unreachable!()
    }

    #[test]
    fn test_elapsed_is_zero_on_entering_monitoring() {
        let controller = monitoring(settings(3600, 180, 0.5));
        assert_eq!(controller.state(), AppState::Monitoring);
        assert_eq!(controller.elapsed(t0()), TimeDelta::zero());
        assert_eq!(controller.remaining(t0()), TimeDelta::seconds(3600));
    }

    #[test]
    fn test_elapsed_never_decreases_without_idle_reset() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        let mut previous = TimeDelta::zero();

        // 300s of use followed by 250s away, repeatedly: idle pauses, no resets.
        for second in 0..3000 {
            if second % 550 < 300 {
                controller.record_activity(at(second));
            }
            let effects = controller.tick(at(second));
            assert!(!effects.contains(&Effect::EnterBreak));
            let elapsed = controller.elapsed(at(second));
            assert!(elapsed >= previous, "elapsed went from {} to {} at {}s", previous, elapsed, second);
            previous = elapsed;
        }
    }

    #[test]
    fn test_break_starts_exactly_at_interval() {
        let mut controller = monitoring(settings(60, 180, 0.5));

        for second in 0..60 {
            controller.record_activity(at(second));
            assert!(controller.tick(at(second)).is_empty(), "break started early at {}s", second);
            assert_eq!(controller.state(), AppState::Monitoring);
        }

        controller.record_activity(at(60));
        assert_eq!(controller.tick(at(60)), vec![Effect::StopMonitoring, Effect::EnterBreak]);
        assert_eq!(controller.state(), AppState::BreakTime);
        assert_eq!(controller.accumulated_usage(), TimeDelta::seconds(60));
    }

    #[test]
    fn test_short_idle_suspends_usage() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        for second in (0..=600).step_by(10) {
            controller.record_activity(at(second));
        }

        assert!(controller.tick(at(800)).is_empty());
        assert!(controller.is_idle_paused());
        assert_eq!(controller.accumulated_usage(), TimeDelta::seconds(800));
        assert_eq!(controller.elapsed(at(900)), TimeDelta::seconds(800));

        controller.record_activity(at(1000));
        assert!(!controller.is_idle_paused());
        assert_eq!(controller.elapsed(at(1010)), TimeDelta::seconds(810));
    }

    #[test]
    fn test_long_idle_discards_usage() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        for second in (0..=600).step_by(10) {
            controller.record_activity(at(second));
        }

        assert!(controller.tick(at(2500)).is_empty());
        assert_eq!(controller.accumulated_usage(), TimeDelta::zero());
        assert_eq!(controller.elapsed(at(2500)), TimeDelta::zero());
        assert_eq!(controller.elapsed(at(2600)), TimeDelta::zero());

        // Further idle ticks keep it at zero.
        controller.tick(at(2700));
        assert_eq!(controller.elapsed(at(2700)), TimeDelta::zero());

        controller.record_activity(at(2800));
        assert_eq!(controller.elapsed(at(2830)), TimeDelta::seconds(30));
    }

    #[test]
    fn test_idle_thresholds_are_inclusive() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        controller.tick(at(179));
        assert!(!controller.is_idle_paused());
        controller.tick(at(180));
        assert!(controller.is_idle_paused());
        assert_eq!(controller.accumulated_usage(), TimeDelta::seconds(180));

        controller.tick(at(1800));
        assert_eq!(controller.accumulated_usage(), TimeDelta::zero());
    }

    #[test]
    fn test_confirming_twice_exits_once() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        let broke_at = use_until_break(&mut controller, 0);

        let first = controller.confirm_break(at(broke_at + 5), ConfirmSource::Button);
        let second = controller.confirm_break(at(broke_at + 5), ConfirmSource::Shortcut);

        assert_eq!(first, vec![Effect::ExitBreak, Effect::StartMonitoring]);
        assert!(second.is_empty());
        assert_eq!(controller.state(), AppState::Monitoring);
        assert_eq!(controller.elapsed(at(broke_at + 5)), TimeDelta::zero());
    }

    #[test]
    fn test_confirm_outside_break_is_ignored() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        assert!(controller.confirm_break(at(10), ConfirmSource::AutoTimeout).is_empty());
        assert_eq!(controller.state(), AppState::Monitoring);
    }

    #[test]
    fn test_pausing_during_break_exits_break_once() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        let broke_at = use_until_break(&mut controller, 0);

        assert_eq!(controller.toggle(at(broke_at + 1)), vec![Effect::ExitBreak, Effect::StopMonitoring]);
        assert_eq!(controller.state(), AppState::Paused);
        assert!(controller.disable(at(broke_at + 2)).is_empty());
        assert!(controller.confirm_break(at(broke_at + 3), ConfirmSource::AutoTimeout).is_empty());

        assert_eq!(controller.toggle(at(broke_at + 10)), vec![Effect::StartMonitoring]);
        assert_eq!(controller.elapsed(at(broke_at + 10)), TimeDelta::zero());
    }

    #[test]
    fn test_disable_then_enable_resets_elapsed() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        controller.record_activity(at(90));
        assert_eq!(controller.disable(at(100)), vec![Effect::StopMonitoring]);
        assert_eq!(controller.enable(at(100)), vec![Effect::StartMonitoring]);
        assert_eq!(controller.elapsed(at(100)), TimeDelta::zero());
    }

    #[test]
    fn test_paused_ignores_activity_and_ticks() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        controller.record_activity(at(5));
        controller.disable(at(10));

        controller.record_activity(at(20));
        assert_eq!(controller.last_activity_time(), Some(at(5)));
        assert!(!controller.is_idle_paused());
        assert!(controller.tick(at(500)).is_empty());
        assert_eq!(controller.state(), AppState::Paused);
        assert_eq!(controller.elapsed(at(500)), TimeDelta::seconds(10));
        assert_eq!(controller.remaining(at(500)), TimeDelta::seconds(50));

        assert_eq!(controller.enable(at(600)), vec![Effect::StartMonitoring]);
        assert_eq!(controller.last_activity_time(), Some(at(600)));
        assert_eq!(controller.elapsed(at(600)), TimeDelta::zero());
        assert!(controller.tick(at(610)).is_empty());
        assert!(!controller.is_idle_paused());
    }

    #[test]
    fn test_break_ignores_activity() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        let broke_at = use_until_break(&mut controller, 0);
        let last_activity = controller.last_activity_time();
        assert_eq!(last_activity, Some(at(broke_at)));

        controller.record_activity(at(broke_at + 10));
        assert_eq!(controller.last_activity_time(), last_activity);
        assert!(!controller.is_idle_paused());
        assert_eq!(controller.state(), AppState::BreakTime);
        assert_eq!(controller.accumulated_usage(), TimeDelta::seconds(60));
        assert_eq!(controller.elapsed(at(broke_at + 30)), TimeDelta::seconds(60));
        assert!(controller.tick(at(broke_at + 30)).is_empty());
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut controller = monitoring(settings(60, 180, 1.0));
        assert_eq!(controller.remaining(at(5000)), TimeDelta::zero());

        let broke_at = use_until_break(&mut controller, 0);
        assert_eq!(controller.remaining(at(broke_at + 1000)), TimeDelta::zero());
    }

    #[test]
    fn test_reset_timer() {
        let mut controller = monitoring(settings(60, 180, 0.5));
        controller.record_activity(at(20));
        assert!(controller.reset_timer(at(40)).is_empty());
        assert_eq!(controller.elapsed(at(40)), TimeDelta::zero());

        let broke_at = use_until_break(&mut controller, 40);
        assert_eq!(broke_at, 100);
        assert_eq!(controller.reset_timer(at(101)), vec![Effect::ExitBreak, Effect::StartMonitoring]);
        assert_eq!(controller.state(), AppState::Monitoring);
    }

    #[test]
    fn test_update_settings_applies_on_next_tick() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        controller.record_activity(at(100));
        assert!(controller.tick(at(100)).is_empty());

        controller.update_settings(settings(90, 180, 0.5));
        controller.record_activity(at(101));
        assert_eq!(controller.tick(at(101)), vec![Effect::StopMonitoring, Effect::EnterBreak]);
    }

    #[test]
    fn test_snapshot_serializes_seconds() {
        let mut controller = monitoring(settings(3600, 180, 0.5));
        controller.record_activity(at(30));
        let snapshot = controller.snapshot(at(30));
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["state"], "monitoring");
        assert_eq!(json["elapsed"], 30);
        assert_eq!(json["remaining"], 3570);
        assert_eq!(json["idle_paused"], false);
    }
}
