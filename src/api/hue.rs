//! Philips Hue bridge client (REST API v1).
//!
//! Talks to `http://{bridge_ip}/api/{username}/lights`. On a break the current
//! state of every configured light is saved, then the lights turn red. On
//! restore each light with a saved state gets its power, brightness and the
//! color fields of its saved color mode back, and the saved states are
//! cleared. Lights whose state could not be read are left alone.
//!
//! When disabled, or without a bridge address, username and at least one
//! light id, the client is inactive and both calls return immediately.

use super::LightController;
use crate::libs::config::ConfigModule;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_print, msg_warning};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const LIGHTS_URL: &str = "lights";
/// Bridge transition time unit is 100ms.
const TRANSITION_TIME: u16 = 10;
const BREAK_HUE: u16 = 0;
const FULL_SATURATION: u8 = 254;
const FULL_BRIGHTNESS: u8 = 254;

#[derive(Debug, thiserror::Error)]
pub enum HueError {
    #[error("Hue integration is not configured")]
    NotConfigured,
    #[error("Request to the Hue bridge failed with status {0}")]
    RequestFailed(StatusCode),
    #[error("Hue bridge unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// State of a single light as reported by the bridge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HueLightState {
    pub on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xy: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormode: Option<String>,
}

impl HueLightState {
    /// Body that puts a light back into this state.
    ///
    /// Only the color fields of the saved color mode are sent; sending e.g.
    /// `hue` to a light that was in `ct` mode would switch its mode.
    pub fn restore_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("on".into(), json!(self.on));
        body.insert("transitiontime".into(), json!(TRANSITION_TIME));
        if let Some(bri) = self.bri {
            body.insert("bri".into(), json!(bri));
        }
        match self.colormode.as_deref() {
            Some("hs") => {
                if let Some(hue) = self.hue {
                    body.insert("hue".into(), json!(hue));
                }
                if let Some(sat) = self.sat {
                    body.insert("sat".into(), json!(sat));
                }
            }
            Some("xy") => {
                if let Some(xy) = self.xy {
                    body.insert("xy".into(), json!(xy));
                }
            }
            Some("ct") => {
                if let Some(ct) = self.ct {
                    body.insert("ct".into(), json!(ct));
                }
            }
            _ => {}
        }
        Value::Object(body)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HueLight {
    pub name: String,
    pub state: HueLightState,
}

/// Body that turns a light into the break color.
pub fn break_state_body() -> Value {
    json!({
        "on": true,
        "hue": BREAK_HUE,
        "sat": FULL_SATURATION,
        "bri": FULL_BRIGHTNESS,
        "transitiontime": TRANSITION_TIME,
    })
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HueConfig {
    /// Turns the integration on without losing the bridge settings.
    pub enabled: bool,
    /// Bridge address, `host` or `host:port`.
    pub bridge_ip: String,
    /// API username issued by the bridge.
    pub username: String,
    /// Lights that turn red during a break.
    pub light_ids: Vec<String>,
}

impl HueConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "hue".to_string(),
            name: "Philips Hue".to_string(),
        }
    }

    /// Bridge address, username and at least one light are present.
    pub fn is_configured(&self) -> bool {
        !self.bridge_ip.trim().is_empty() && !self.username.trim().is_empty() && !self.light_ids.is_empty()
    }

    pub fn init(config: &Option<Self>) -> Result<Self> {
        let config = config.clone().unwrap_or(Self {
            enabled: true,
            bridge_ip: "".to_string(),
            username: "".to_string(),
            light_ids: Vec::new(),
        });
        msg_print!(Message::ConfigModuleHue);
        let enabled = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptHueEnabled.to_string())
            .default(config.enabled)
            .interact()?;
        let bridge_ip: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptHueBridgeIp.to_string())
            .default(config.bridge_ip)
            .interact_text()?;
        let username: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptHueUsername.to_string())
            .default(config.username)
            .interact_text()?;
        let light_ids: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptHueLightIds.to_string())
            .default(config.light_ids.join(","))
            .allow_empty(true)
            .interact_text()?;

        Ok(Self {
            enabled,
            bridge_ip: bridge_ip.trim().to_string(),
            username: username.trim().to_string(),
            light_ids: parse_light_ids(&light_ids),
        })
    }
}

/// Splits a comma/space separated list of light ids.
pub fn parse_light_ids(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Hue bridge client (v1 REST API).
#[derive(Debug)]
pub struct Hue {
    client: Client,
    config: Option<HueConfig>,
    /// States captured before the break color was applied, keyed by light id.
    saved_states: Mutex<HashMap<String, HueLightState>>,
}

impl Hue {
    pub fn new(config: Option<HueConfig>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            saved_states: Mutex::new(HashMap::new()),
        })
    }

    /// Enabled and fully configured.
    pub fn is_active(&self) -> bool {
        self.config.as_ref().is_some_and(|config| config.enabled && config.is_configured())
    }

    fn base_url(&self) -> Result<String, HueError> {
        let config = self.config.as_ref().ok_or(HueError::NotConfigured)?;
        if config.bridge_ip.trim().is_empty() || config.username.trim().is_empty() {
            return Err(HueError::NotConfigured);
        }
        Ok(format!("http://{}/api/{}", config.bridge_ip.trim(), config.username.trim()))
    }

    fn target_lights(&self) -> Vec<String> {
        self.config.as_ref().map(|config| config.light_ids.clone()).unwrap_or_default()
    }

    /// All lights known to the bridge, ordered by id.
    pub async fn get_lights(&self) -> Result<BTreeMap<String, HueLight>, HueError> {
        let url = format!("{}/{}", self.base_url()?, LIGHTS_URL);
        let res = self.client.get(url).send().await?;
        if res.status() != StatusCode::OK {
            return Err(HueError::RequestFailed(res.status()));
        }
        Ok(res.json::<BTreeMap<String, HueLight>>().await?)
    }

    pub async fn get_light_state(&self, light_id: &str) -> Result<HueLightState, HueError> {
        let url = format!("{}/{}/{}", self.base_url()?, LIGHTS_URL, light_id);
        let res = self.client.get(url).send().await?;
        if res.status() != StatusCode::OK {
            return Err(HueError::RequestFailed(res.status()));
        }
        Ok(res.json::<HueLight>().await?.state)
    }

    pub async fn set_light_state(&self, light_id: &str, state: &Value) -> Result<(), HueError> {
        let url = format!("{}/{}/{}/state", self.base_url()?, LIGHTS_URL, light_id);
        let res = self.client.put(url).json(state).send().await?;
        if res.status() != StatusCode::OK {
            return Err(HueError::RequestFailed(res.status()));
        }
        Ok(())
    }

    /// True when the bridge answers and reports at least one light.
    pub async fn test_connection(&self) -> bool {
        match self.get_lights().await {
            Ok(lights) => !lights.is_empty(),
            Err(e) => {
                msg_warning!(Message::HueConnectionFailed(e.to_string()));
                false
            }
        }
    }

    pub async fn saved_state(&self, light_id: &str) -> Option<HueLightState> {
        self.saved_states.lock().await.get(light_id).cloned()
    }
}

impl LightController for Hue {
    /// Saves the current state of every target light, then turns them red.
    /// Per-light failures are logged and skipped.
    async fn apply_break_state(&self) -> Result<()> {
        if !self.is_active() {
            msg_debug!(Message::LightsSkipped);
            return Ok(());
        }

        let lights = self.target_lights();
        let mut saved = self.saved_states.lock().await;
        saved.clear();

        for light_id in &lights {
            match self.get_light_state(light_id).await {
                Ok(state) => {
                    msg_debug!(format!("Saved state for light {}", light_id));
                    saved.insert(light_id.clone(), state);
                }
                Err(e) => msg_warning!(Message::LightStateSaveFailed {
                    light_id: light_id.clone(),
                    error: e.to_string(),
                }),
            }
        }

        let body = break_state_body();
        for light_id in &lights {
            if let Err(e) = self.set_light_state(light_id, &body).await {
                msg_warning!(Message::LightSetFailed {
                    light_id: light_id.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Puts every light with a saved state back, then forgets the states.
    async fn restore(&self) -> Result<()> {
        if !self.is_active() {
            msg_debug!(Message::LightsSkipped);
            return Ok(());
        }

        let mut saved = self.saved_states.lock().await;
        for light_id in self.target_lights() {
            let Some(state) = saved.get(&light_id) else {
                msg_debug!(Message::NoSavedLightState(light_id.clone()));
                continue;
            };
            match self.set_light_state(&light_id, &state.restore_body()).await {
                Ok(()) => msg_debug!(format!("Restored light {}", light_id)),
                Err(e) => msg_warning!(Message::LightRestoreFailed {
                    light_id: light_id.clone(),
                    error: e.to_string(),
                }),
            }
        }
        saved.clear();
        Ok(())
    }
}
