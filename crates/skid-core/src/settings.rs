use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for the trajectory interception scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptSettings {
    /// Number of trajectory samples advanced per scan step.
    pub stride: usize,
    /// Highest ball position (uu) that can be played with ground control.
    pub max_height: f64,
    /// Speed added to the current speed when estimating travel time, in uu/s.
    pub acceleration_allowance: f64,
    /// Lower bound of the effective speed in uu/s.
    pub min_speed: f64,
    /// Upper bound of the effective speed in uu/s.
    pub max_speed: f64,
    /// Extra time (s) granted to the car when comparing against the ball.
    pub slack: f64,
}

impl Default for InterceptSettings {
    fn default() -> Self {
        Self {
            stride: 4,
            max_height: 300.0,
            acceleration_allowance: 600.0,
            min_speed: 1000.0,
            max_speed: 2300.0,
            slack: 0.1,
        }
    }
}

/// Settings for the tactical target selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Half-size of the square around the field center that counts as a kickoff spot.
    pub kickoff_center_radius: f64,
    /// Ball speed (uu/s) below which the ball counts as stationary.
    pub stationary_speed: f64,
    /// Horizontal distance to the ball at which the kickoff flip starts.
    pub kickoff_flip_distance: f64,

    /// Minimum ball speed towards our goal for shadowing, in uu/s.
    pub shadow_min_approach_speed: f64,
    /// Maximum ball distance from our goal for shadowing.
    pub shadow_max_goal_distance: f64,
    /// Fraction of the goal-ball distance the shadow point sits behind the ball.
    pub shadow_distance_ratio: f64,
    pub shadow_min_offset: f64,
    pub shadow_max_offset: f64,

    /// Boost amount below which boost pads are considered.
    pub low_boost: f64,
    /// Weight of the pad-to-target detour in the pad score.
    pub pad_target_weight: f64,
    /// Ball distance to our goal under which only nearby pads are considered.
    pub active_defense_distance: f64,
    /// Maximum pad distance from the car under active defense.
    pub defensive_pad_radius: f64,

    /// Stand-off distance behind a ground ball.
    pub standoff: f64,
    /// Stand-off distance behind a high ball.
    pub high_ball_standoff: f64,
    /// Height above which a ball counts as high.
    pub high_ball_height: f64,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            kickoff_center_radius: 50.0,
            stationary_speed: 1.0,
            kickoff_flip_distance: 700.0,
            shadow_min_approach_speed: 300.0,
            shadow_max_goal_distance: 5000.0,
            shadow_distance_ratio: 0.45,
            shadow_min_offset: 650.0,
            shadow_max_offset: 1200.0,
            low_boost: 25.0,
            pad_target_weight: 0.35,
            active_defense_distance: 3000.0,
            defensive_pad_radius: 1500.0,
            standoff: 240.0,
            high_ball_standoff: 320.0,
            high_ball_height: 250.0,
        }
    }
}

/// Settings for the speed controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    /// Bounds of the desired speed derived from a time budget, in uu/s.
    pub min_speed: f64,
    pub max_speed: f64,
    /// Cruise speed when facing the target.
    pub aligned_speed: f64,
    /// Cruise speed when turning towards the target.
    pub turning_speed: f64,
    /// Desired speed per unit of distance when close to the target.
    pub short_range_factor: f64,
    /// Speed error (uu/s) that maps to full throttle.
    pub throttle_gain: f64,
    /// Heading error (rad) under which the car counts as facing the target.
    pub aligned_angle: f64,
    /// Minimum desired speed for boosting.
    pub boost_min_speed: f64,
    /// Minimum speed deficit for boosting.
    pub boost_min_deficit: f64,
    /// Heading error (rad) above which the handbrake may engage.
    pub handbrake_angle: f64,
    /// Speed under which the handbrake may engage.
    pub handbrake_max_speed: f64,

    /// Ball height under which it can be carried.
    pub ball_control_height: f64,
    /// Forward reach of the ball-control zone.
    pub ball_control_reach: f64,
    /// Half-width of the ball-control zone.
    pub ball_control_half_width: f64,
    /// Target distance under which a carried ball is popped up.
    pub pop_distance: f64,
    /// Pitch applied while carrying the ball.
    pub nudge_pitch: f64,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            min_speed: 700.0,
            max_speed: 2200.0,
            aligned_speed: 1900.0,
            turning_speed: 1500.0,
            short_range_factor: 1.2,
            throttle_gain: 500.0,
            aligned_angle: 0.35,
            boost_min_speed: 1200.0,
            boost_min_deficit: 400.0,
            handbrake_angle: 1.6,
            handbrake_max_speed: 800.0,
            ball_control_height: 150.0,
            ball_control_reach: 250.0,
            ball_control_half_width: 70.0,
            pop_distance: 350.0,
            nudge_pitch: -0.2,
        }
    }
}

/// Settings for the whole agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub intercept: InterceptSettings,
    pub policy: PolicySettings,
    pub speed: SpeedSettings,
}

impl AgentSettings {
    /// Load the settings from a file, or store the default settings if the file does
    /// not exist. Falls back to the defaults if the file cannot be parsed.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    log::warn!(
                        "Failed to parse agent settings in {}: {}",
                        path.display(),
                        err
                    );
                    Ok(Self::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.store(path)?;
                Ok(settings)
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read agent settings from {}", path.display())),
        }
    }

    /// Store the settings in the given file.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write agent settings to {}", path.display()))
    }
}
