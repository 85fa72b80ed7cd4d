use crate::api::Hue;
use crate::libs::activity::ActivitySource;
use crate::libs::config::Config;
use crate::libs::presentation::ConsolePresenter;
use crate::libs::runtime::{spawn_command_reader, Runtime};
use anyhow::Result;

/// Runs the reminder until `q` or a shutdown signal.
pub async fn cmd() -> Result<()> {
    let config_path = Config::path()?;
    let config = Config::read_from(&config_path)?;
    let timer = config.timer();

    let (input, activity_rx) = ActivitySource::new(timer.activity_throttle());
    let presenter = ConsolePresenter::new(timer.notifications);
    let lights = Hue::new(config.hue.clone())?;

    let commands = spawn_command_reader();
    Runtime::new(config, input, activity_rx, presenter, lights)
        .with_config_path(config_path)
        .run(commands)
        .await
}
