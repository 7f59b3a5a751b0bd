use serde::{Deserialize, Serialize};

use crate::geometry::tolerance::{EPS_POS, MAP_TOL, STROKE_MATCH_TOL};
use crate::model::Color;

/// Tunables of the engine. Every field has a default, so partial JSON
/// documents deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snap step for drag updates; `<= 0` disables snapping.
    pub grid: f32,
    /// Distance under which two points count as coincident.
    pub coincide_eps: f32,
    /// Slack when testing whether a component's pins sit on a straight run.
    pub map_tolerance: f32,
    /// Gap-to-segment distance accepted as a direct stroke match.
    pub stroke_match_tolerance: f32,
    /// Upper bound on merge passes in `unify_inline`.
    pub max_unify_passes: usize,
    /// Upper bound on rebuilds caused by splitting wires at junctions.
    pub max_junction_passes: usize,
    /// Color reported for straight runs mixing several wire colors.
    pub neutral_color: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid: 10.0,
            coincide_eps: EPS_POS,
            map_tolerance: MAP_TOL,
            stroke_match_tolerance: STROKE_MATCH_TOL,
            max_unify_passes: 10_000,
            max_junction_passes: 3,
            neutral_color: Color::rgb(0x80, 0x80, 0x80),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "grid": 5.0 }"#).unwrap();
        assert_eq!(cfg.grid, 5.0);
        assert_eq!(cfg.max_junction_passes, EngineConfig::default().max_junction_passes);
    }
}
