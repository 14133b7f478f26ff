use super::traits::{ConfigSection, ConfigManifest, FieldManifest};
use crate::error::StridegenError;
use serde::{Deserialize, Serialize};

/// Settings shared with the physics and fitness collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated seconds per tick
    pub tick_seconds: f64,
    /// Global speed-up applied to the simulated clock
    pub time_scale: f64,
    /// Torque per unit magnitude per second
    pub torque_speed: f64,
    pub head_weight: f64,
    pub body_weight: f64,
    pub limb_weight: f64,
    /// Weight of accumulated head height, normalised by chromosome length
    pub upright_weight: f64,
    pub camera_height: f64,
    pub camera_distance: f64,
    /// Lateral gap between neighbouring walkers at spawn
    pub spawn_spacing: f64,
    pub parallel_decode: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.02,
            time_scale: 1.0,
            torque_speed: 500_000.0,
            head_weight: 5.0,
            body_weight: 1.0,
            limb_weight: 1.0,
            upright_weight: 0.0,
            camera_height: 7.5,
            camera_distance: 21.0,
            spawn_spacing: 2.0,
            parallel_decode: false,
        }
    }
}

impl SimulationConfig {
    /// Scale handed to `ActuationCommand::torque`
    pub fn actuation_time_scale(&self) -> f64 {
        self.tick_seconds * self.time_scale * self.torque_speed
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), StridegenError> {
        if self.tick_seconds <= 0.0 {
            return Err(StridegenError::Configuration(
                "Tick duration must be positive".to_string()
            ));
        }
        if self.time_scale <= 0.0 {
            return Err(StridegenError::Configuration(
                "Time scale must be positive".to_string()
            ));
        }
        if self.torque_speed < 0.0 {
            return Err(StridegenError::Configuration(
                "Torque speed must not be negative".to_string()
            ));
        }
        if self.spawn_spacing < 0.0 {
            return Err(StridegenError::Configuration(
                "Spawn spacing must not be negative".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Simulation".to_string(),
            fields: vec![
                FieldManifest::new("tick_seconds", "float", serde_json::json!(self.tick_seconds), "Simulated seconds per tick")
                    .with_range(Some(0.0), None),
                FieldManifest::new("time_scale", "float", serde_json::json!(self.time_scale), "Global clock multiplier")
                    .with_range(Some(0.0), None),
                FieldManifest::new("torque_speed", "float", serde_json::json!(self.torque_speed), "Torque per unit magnitude per second")
                    .with_range(Some(0.0), None),
                FieldManifest::new("head_weight", "float", serde_json::json!(self.head_weight), "Fitness weight of the head's forward position"),
                FieldManifest::new("body_weight", "float", serde_json::json!(self.body_weight), "Fitness weight of the body's forward position"),
                FieldManifest::new("limb_weight", "float", serde_json::json!(self.limb_weight), "Fitness weight of each limb's forward position"),
                FieldManifest::new("upright_weight", "float", serde_json::json!(self.upright_weight), "Fitness weight of average head height"),
                FieldManifest::new("camera_height", "float", serde_json::json!(self.camera_height), "Camera height above the leader"),
                FieldManifest::new("camera_distance", "float", serde_json::json!(self.camera_distance), "Camera distance behind the walker plane"),
                FieldManifest::new("spawn_spacing", "float", serde_json::json!(self.spawn_spacing), "Lateral gap between walkers")
                    .with_range(Some(0.0), None),
                FieldManifest::new("parallel_decode", "bool", serde_json::json!(self.parallel_decode), "Decode chromosomes on the rayon pool"),
            ],
        }
    }
}
