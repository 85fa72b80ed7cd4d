//! English text for [`Message`].
//!
//! All wording is kept here so the rest of the code only deals with typed
//! variants and their parameters.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigFileNotFound => "Configuration file not found".to_string(),
            Message::ConfigSaveFailed(error) => format!("Failed to save configuration: {}", error),
            Message::ConfigModuleTimer => "Timer settings".to_string(),
            Message::ConfigModuleHue => "Philips Hue settings".to_string(),
            Message::InvalidBreakInterval => "Break interval must be greater than zero".to_string(),
            Message::InvalidTickInterval => "Tick interval must be greater than zero".to_string(),
            Message::InvalidIdleResetRatio(ratio) => format!("Idle reset ratio must be between 0 and 1, got {}", ratio),

            // === MONITOR MESSAGES ===
            Message::MonitorStarted(interval) => format!("Teumnirm is running, a break is due every {}", interval),
            Message::MonitoringPaused => "Monitoring paused".to_string(),
            Message::MonitoringResumed => "Monitoring resumed".to_string(),
            Message::TimerReset => "Timer reset".to_string(),
            Message::BreakIntervalChanged(interval) => format!("A break is now due every {}", interval),
            Message::NextBreakIn(remaining) => format!("Next break in: {}", remaining),
            Message::Status {
                state,
                elapsed,
                remaining,
                idle,
            } => {
                let idle = if *idle { " (idle)" } else { "" };
                format!("Status: {}{} | used {} | next break in {}", state, idle, elapsed, remaining)
            }
            Message::CommandHelp => {
                "Commands: [Enter]/c confirm break, r reset timer, p pause/resume, i <min> set interval, s status, q quit"
                    .to_string()
            }
            Message::UnknownCommand(word) => format!("Unknown command '{}', type h for help", word),
            Message::ShuttingDown => "Shutting down".to_string(),

            // === BREAK MESSAGES ===
            Message::BreakTitle => "Break Time! 🧘".to_string(),
            Message::BreakHint => "Take a rest or stretch".to_string(),
            Message::BreakStarted { at, used } => format!("Break started at {} after {} of use", at, used),
            Message::BreakConfirmHint => "Press Enter when you are back".to_string(),
            Message::AutoDismissAt(at) => format!("Auto-dismiss at {}", at),
            Message::AutoDismissIn(left) => format!("Auto-dismiss in {}", left),
            Message::BreakEnded => "Break over, welcome back".to_string(),
            Message::NotificationFailed(error) => format!("Failed to show desktop notification: {}", error),

            // === ACTIVITY MESSAGES ===
            Message::ActivityListenerFailed(error) => format!("Cannot listen to keyboard and mouse events: {}", error),
            Message::InputPermissionHint => {
                "Grant Input Monitoring and Accessibility access to your terminal (System Settings > Privacy & Security), then restart teumnirm. The timer keeps running but cannot see activity.".to_string()
            }

            // === SIGNAL MESSAGES ===
            Message::ReceivedSigterm => "Received SIGTERM".to_string(),
            Message::ReceivedSigint => "Received SIGINT".to_string(),
            Message::ReceivedCtrlC => "Received Ctrl+C".to_string(),
            Message::SignalHandlerFailed(error) => format!("Failed to install signal handler: {}", error),

            // === HUE MESSAGES ===
            Message::HueNotConfigured => "Philips Hue is not configured, run `teumnirm init`".to_string(),
            Message::HueConnectionOk => "Hue bridge connection works".to_string(),
            Message::HueConnectionFailed(error) => format!("Hue bridge connection failed: {}", error),
            Message::LightsNotFound => "The bridge reports no lights".to_string(),
            Message::LightsSkipped => "Hue integration inactive, leaving lights alone".to_string(),
            Message::LightStateSaveFailed { light_id, error } => {
                format!("Failed to read state of light {}: {}", light_id, error)
            }
            Message::LightSetFailed { light_id, error } => format!("Failed to set light {}: {}", light_id, error),
            Message::LightRestoreFailed { light_id, error } => {
                format!("Failed to restore light {}: {}", light_id, error)
            }
            Message::NoSavedLightState(light_id) => format!("No saved state for light {}, skipping", light_id),
            Message::LightsApplyFailed(error) => format!("Failed to switch lights to break color: {}", error),
            Message::LightsRestoreFailed(error) => format!("Failed to restore lights: {}", error),
            Message::LightsTaskFailed(error) => format!("Light task failed: {}", error),
            Message::LightsShutdownTimeout => "Lights did not answer in time, exiting anyway".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select nodes to configure".to_string(),
            Message::PromptBreakInterval => "Break interval (minutes)".to_string(),
            Message::PromptIdleThreshold => "Idle threshold (minutes)".to_string(),
            Message::PromptIdleResetRatio => "Idle reset ratio (0-1 of the break interval)".to_string(),
            Message::PromptAutoRestoreInterval => "Auto-dismiss time (minutes, 0 disables)".to_string(),
            Message::PromptShowTimer => "Show time until next break".to_string(),
            Message::PromptNotifications => "Show desktop notifications".to_string(),
            Message::PromptHueEnabled => "Enable Philips Hue integration".to_string(),
            Message::PromptHueBridgeIp => "Bridge IP address".to_string(),
            Message::PromptHueUsername => "Bridge API username".to_string(),
            Message::PromptHueLightIds => "Lights to control (comma separated ids)".to_string(),
        };

        write!(f, "{}", text)
    }
}
