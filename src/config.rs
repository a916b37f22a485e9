//! Session configuration. Stored on disk as [ron]:
//!
//! ```text
//! (
//!     paradigm: Cvsa,
//!     smooth_time: 0.15,
//!     frame_rate: 90.0,
//!     layout: (left_x: -1.5, right_x: 1.5, baseline_y: 1.65, depth_z: 4.0, excursion: 1.0),
//!     sharpness: (static_level: 1.0, feedback_baseline: 0.5),
//! )
//! ```
//!
//! Every field may be left out, in which case the default below is used.

use crate::paradigm::Paradigm;
use crate::scene::{Side, Vec3};

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt, fs, path::Path};

/// Everything a session needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Which experiment to run
    pub paradigm: Paradigm,
    /// Time constant of the smoothing spring, in seconds
    pub smooth_time: f32,
    /// Frames per second driven by the run loop
    pub frame_rate: f32,
    /// Where the cubes sit and how far they move
    pub layout: CubeLayout,
    /// Material sharpness levels
    pub sharpness: SharpnessLevels,
}

/// Placement of the two feedback cubes, in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CubeLayout {
    /// Horizontal position of the left cube
    pub left_x: f32,
    /// Horizontal position of the right cube
    pub right_x: f32,
    /// Height of a cube at rest
    pub baseline_y: f32,
    /// Depth of both cubes
    pub depth_z: f32,
    /// Height gained at full decoder confidence
    pub excursion: f32,
}

/// Material sharpness levels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SharpnessLevels {
    /// Used when the paradigm does not drive the material
    pub static_level: f32,
    /// Resting level when the paradigm does drive the material
    pub feedback_baseline: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            paradigm: Paradigm::default(),
            smooth_time: 0.15,
            frame_rate: 60.0,
            layout: CubeLayout::default(),
            sharpness: SharpnessLevels::default(),
        }
    }
}

impl Default for CubeLayout {
    fn default() -> Self {
        Self {
            left_x: -1.5,
            right_x: 1.5,
            baseline_y: 1.65,
            depth_z: 4.0,
            excursion: 1.0,
        }
    }
}

impl Default for SharpnessLevels {
    fn default() -> Self {
        Self {
            static_level: 1.0,
            feedback_baseline: 0.5,
        }
    }
}

impl CubeLayout {
    /// Where a cube sits at rest.
    pub fn baseline(&self, cube: Side) -> Vec3 {
        self.at_height(cube, self.baseline_y)
    }

    /// Where a cube sits for decoder value `value`. Only values above 0.5
    /// lift the cube; the lift is not clamped above. NaN stays NaN.
    pub fn lifted(&self, cube: Side, value: f32) -> Vec3 {
        let raw = (value - 0.5) * 2.0;
        // f32::max would turn NaN into 0
        let offset = if 0.0 > raw { 0.0 } else { raw };
        self.at_height(cube, self.baseline_y + offset * self.excursion)
    }

    fn at_height(&self, cube: Side, y: f32) -> Vec3 {
        let x = match cube {
            Side::Left => self.left_x,
            Side::Right => self.right_x,
        };
        Vec3::new(x, y, self.depth_z)
    }
}

/// What can go wrong loading or saving a [SessionConfig].
#[derive(Debug)]
pub enum ConfigError {
    /// Returned when io fails when reading or writing files.
    IoError(std::io::Error),

    /// Returned when serialization fails.
    RonError(ron::Error),

    /// Returned when deserialization fails.
    RonSpannedError(ron::de::SpannedError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ConfigError as CE;
        let msg = match self {
            CE::IoError(error) => Cow::from(format!("io error: {}", error)),
            CE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            CE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for ConfigError {}

impl SessionConfig {
    /// Read a [SessionConfig] from the path provided.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_ron(&text)
    }

    /// Parse a [SessionConfig] from ron text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        ron::de::from_str(text).map_err(ConfigError::RonSpannedError)
    }

    /// Write out a [SessionConfig] to the path provided.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::RonError)?;
        fs::write(path, text).map_err(ConfigError::IoError)
    }
}
