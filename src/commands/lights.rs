use crate::api::Hue;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_info, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LightsArgs {
    /// Only check that the bridge answers and reports lights
    #[arg(short, long)]
    test: bool,
}

pub async fn cmd(args: LightsArgs) -> Result<()> {
    let config = Config::read()?;
    let Some(hue_config) = config.hue.clone() else {
        msg_bail_anyhow!(Message::HueNotConfigured);
    };
    let targets = hue_config.light_ids.clone();
    let hue = Hue::new(Some(hue_config))?;

    if args.test {
        if hue.test_connection().await {
            msg_success!(Message::HueConnectionOk);
            return Ok(());
        }
        msg_bail_anyhow!(Message::HueConnectionFailed("no lights reported".to_string()));
    }

    let lights = hue
        .get_lights()
        .await
        .map_err(|e| msg_error_anyhow!(Message::HueConnectionFailed(e.to_string())))?;
    if lights.is_empty() {
        msg_info!(Message::LightsNotFound);
        return Ok(());
    }
    View::lights(&lights, &targets);
    Ok(())
}
