use crate::engine::{Point, Size};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// Everything tunable about the page. Any field left out of the js
/// object passed to `main_js` keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub canvas_id: String,
    /// class marking elements that get a shadow body, without the dot
    pub destroyable_class: String,
    pub background: String,
    pub wall_thickness: f32,
    pub wall_fill: String,
    /// px/ms², positive is down
    pub gravity: f32,
    /// mass·px/ms² applied per keydown
    pub push_force: f32,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    pub label: String,
    /// center of the body at spawn
    pub position: Point,
    pub size: Size,
    pub restitution: f32,
    pub fill: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            canvas_id: String::from("gameCanvas"),
            destroyable_class: String::from("destroyable"),
            background: String::from("#f0f0f0"),
            wall_thickness: 50.0,
            wall_fill: String::from("#14151f"),
            gravity: 0.001,
            push_force: 0.02,
            player: PlayerConfig::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            label: String::from("stickFigure"),
            position: Point { x: 200.0, y: 300.0 },
            size: Size {
                width: 30.0,
                height: 50.0,
            },
            restitution: 0.5,
            fill: String::from("#f55a3c"),
        }
    }
}

impl Config {
    /// `undefined` / `null` -> defaults, anything else must deserialize
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Config::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| anyhow!("Invalid config object : {:#?}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_page() {
        let config = Config::default();
        assert_eq!(config.canvas_id, "gameCanvas");
        assert_eq!(config.destroyable_class, "destroyable");
        assert_eq!(config.background, "#f0f0f0");
        assert_eq!(config.wall_thickness, 50.0);
        assert_eq!(config.push_force, 0.02);
        assert_eq!(config.player.label, "stickFigure");
        assert_eq!(config.player.position, Point { x: 200.0, y: 300.0 });
        assert_eq!(config.player.restitution, 0.5);
    }
}
