use crate::api::hue::HueLight;
use prettytable::{row, Table};
use std::collections::BTreeMap;

pub struct View {}

impl View {
    /// Prints the bridge's lights, marking the ones turned red on breaks.
    pub fn lights(lights: &BTreeMap<String, HueLight>, targets: &[String]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "ON", "BRIGHTNESS", "COLOR MODE", "BREAK"]);
        for (id, light) in lights {
            let on = if light.state.on { "yes" } else { "no" };
            let brightness = light.state.bri.map(|bri| bri.to_string()).unwrap_or_else(|| "-".to_string());
            let color_mode = light.state.colormode.as_deref().unwrap_or("-");
            let target = if targets.contains(id) { "*" } else { "" };
            table.add_row(row![id, light.name, on, brightness, color_mode, target]);
        }
        table.printstd();
    }
}
