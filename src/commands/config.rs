use crate::libs::config::Config;
use crate::msg_print;
use anyhow::Result;

/// Prints the configuration with timer defaults filled in.
pub fn cmd() -> Result<()> {
    let config = Config::read()?;
    let effective = Config {
        timer: Some(config.timer()),
        ..config
    };
    let json = serde_json::to_string_pretty(&effective)?;
    msg_print!(json);
    Ok(())
}
