//! Defines the [`SceneEngine`] trait, the boundary between the feedback logic
//! and whatever actually draws the cubes and plays the sounds. The event
//! mapper and renderer only ever talk to a `SceneEngine`, so they can run
//! against a real engine, a WAV recorder, or an in-memory mirror in tests.

use crate::event_code::CueClass;
use crate::paradigm::Paradigm;

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// Left or right: selects a cube, a material, or an audio channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left cube and left audio channel
    Left,
    /// The right cube and right audio channel
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// A position in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Vec3 {
    #[allow(missing_docs)]
    pub x: f32,
    #[allow(missing_docs)]
    pub y: f32,
    #[allow(missing_docs)]
    pub z: f32,
}

impl Vec3 {
    #[allow(missing_docs)]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Colour of the centre point, which doubles as the outcome indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndicatorColor {
    /// White
    #[default]
    Default,
    /// Green, shown on a hit
    Success,
    /// Red, shown on a miss
    Failure,
    /// Yellow, shown on a timeout
    Warning,
}

/// One of the three audio cues.
pub type Cue = CueClass;

/// Everything a session needs the engine to provide before it can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneObject {
    /// A feedback cube, with its material and audio source
    Cube(Side),
    /// The fixation cross
    FixationCross,
    /// The centre point / outcome indicator
    CenterPoint,
    /// The audio source that plays cues
    CueSource,
    /// The clip played for a cue
    CueClip(Cue),
}

impl SceneObject {
    /// The objects every session checks for at startup.
    pub const REQUIRED: [SceneObject; 8] = [
        SceneObject::Cube(Side::Left),
        SceneObject::Cube(Side::Right),
        SceneObject::FixationCross,
        SceneObject::CenterPoint,
        SceneObject::CueSource,
        SceneObject::CueClip(CueClass::Left),
        SceneObject::CueClip(CueClass::Right),
        SceneObject::CueClip(CueClass::Rest),
    ];
}

impl fmt::Display for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneObject::Cube(side) => write!(f, "{:?} cube", side),
            SceneObject::FixationCross => write!(f, "fixation cross"),
            SceneObject::CenterPoint => write!(f, "centre point"),
            SceneObject::CueSource => write!(f, "cue audio source"),
            SceneObject::CueClip(cue) => write!(f, "{:?} cue clip", cue),
        }
    }
}

/// Failures an engine may report while presenting a frame.
#[derive(Debug)]
pub enum SceneError {
    /// Returned when io fails while writing engine output.
    IoError(std::io::Error),

    /// Returned when the WAV encoder fails.
    HoundError(hound::Error),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            SceneError::IoError(error) => Cow::from(format!("io error: {}", error)),
            SceneError::HoundError(error) => Cow::from(format!("wav error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for SceneError {}

impl From<std::io::Error> for SceneError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<hound::Error> for SceneError {
    fn from(value: hound::Error) -> Self {
        Self::HoundError(value)
    }
}

/// The rendering and audio engine, as seen from the feedback logic.
///
/// Every write is fire-and-forget. Only [`SceneEngine::present`] can fail,
/// and a failure there ends the session.
pub trait SceneEngine {
    /// Switches to the scene hosting `paradigm`.
    fn load_scene(&mut self, paradigm: Paradigm);

    /// Whether `object` is available. Checked once at startup.
    fn has_object(&self, object: SceneObject) -> bool;

    /// Shows or hides an object.
    fn set_active(&mut self, object: SceneObject, active: bool);

    /// Moves a cube, in its parent's local coordinates.
    fn set_position(&mut self, cube: Side, position: Vec3);

    /// Writes the shading sharpness scalar of a cube's material.
    fn set_sharpness(&mut self, cube: Side, sharpness: f32);

    /// Sets the volume of one audio channel.
    fn set_volume(&mut self, channel: Side, volume: f32);

    /// Colours the outcome indicator.
    fn set_indicator_color(&mut self, color: IndicatorColor);

    /// Plays a cue clip once, overlapping anything already playing.
    fn play_cue(&mut self, cue: Cue);

    /// Called once at the end of every frame, `dt` seconds after the last.
    fn present(&mut self, _dt: f32) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Two engines driven in lockstep. An object is only available if both
/// have it.
impl<A, B> SceneEngine for (A, B)
where
    A: SceneEngine,
    B: SceneEngine,
{
    fn load_scene(&mut self, paradigm: Paradigm) {
        self.0.load_scene(paradigm);
        self.1.load_scene(paradigm);
    }

    fn has_object(&self, object: SceneObject) -> bool {
        self.0.has_object(object) && self.1.has_object(object)
    }

    fn set_active(&mut self, object: SceneObject, active: bool) {
        self.0.set_active(object, active);
        self.1.set_active(object, active);
    }

    fn set_position(&mut self, cube: Side, position: Vec3) {
        self.0.set_position(cube, position);
        self.1.set_position(cube, position);
    }

    fn set_sharpness(&mut self, cube: Side, sharpness: f32) {
        self.0.set_sharpness(cube, sharpness);
        self.1.set_sharpness(cube, sharpness);
    }

    fn set_volume(&mut self, channel: Side, volume: f32) {
        self.0.set_volume(channel, volume);
        self.1.set_volume(channel, volume);
    }

    fn set_indicator_color(&mut self, color: IndicatorColor) {
        self.0.set_indicator_color(color);
        self.1.set_indicator_color(color);
    }

    fn play_cue(&mut self, cue: Cue) {
        self.0.play_cue(cue);
        self.1.play_cue(cue);
    }

    fn present(&mut self, dt: f32) -> Result<(), SceneError> {
        self.0.present(dt)?;
        self.1.present(dt)
    }
}
