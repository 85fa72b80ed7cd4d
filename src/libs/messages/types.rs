/// Every user-facing message. Text lives in [`super::display`].
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigFileNotFound,
    ConfigSaveFailed(String), // error
    ConfigModuleTimer,
    ConfigModuleHue,
    InvalidBreakInterval,
    InvalidTickInterval,
    InvalidIdleResetRatio(f64),

    // === MONITOR MESSAGES ===
    MonitorStarted(String), // break interval
    MonitoringPaused,
    MonitoringResumed,
    TimerReset,
    BreakIntervalChanged(String), // new interval
    NextBreakIn(String), // MM:SS
    Status {
        state: String,
        elapsed: String,
        remaining: String,
        idle: bool,
    },
    CommandHelp,
    UnknownCommand(String),
    ShuttingDown,

    // === BREAK MESSAGES ===
    BreakTitle,
    BreakHint,
    BreakStarted {
        at: String,
        used: String,
    },
    BreakConfirmHint,
    AutoDismissAt(String), // HH:MM
    AutoDismissIn(String), // MM:SS
    BreakEnded,
    NotificationFailed(String),

    // === ACTIVITY MESSAGES ===
    ActivityListenerFailed(String),
    InputPermissionHint,

    // === SIGNAL MESSAGES ===
    ReceivedSigterm,
    ReceivedSigint,
    ReceivedCtrlC,
    SignalHandlerFailed(String),

    // === HUE MESSAGES ===
    HueNotConfigured,
    HueConnectionOk,
    HueConnectionFailed(String),
    LightsNotFound,
    LightsSkipped,
    LightStateSaveFailed {
        light_id: String,
        error: String,
    },
    LightSetFailed {
        light_id: String,
        error: String,
    },
    LightRestoreFailed {
        light_id: String,
        error: String,
    },
    NoSavedLightState(String), // light id
    LightsApplyFailed(String),
    LightsRestoreFailed(String),
    LightsTaskFailed(String),
    LightsShutdownTimeout,

    // === PROMPTS ===
    PromptSelectModules,
    PromptBreakInterval,
    PromptIdleThreshold,
    PromptIdleResetRatio,
    PromptAutoRestoreInterval,
    PromptShowTimer,
    PromptNotifications,
    PromptHueEnabled,
    PromptHueBridgeIp,
    PromptHueUsername,
    PromptHueLightIds,
}
