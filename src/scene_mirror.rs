//! A [`SceneEngine`] that draws nothing and remembers everything. It holds the
//! latest value of every output the feedback logic has written, which is all
//! the terminal monitor needs, and is what the tests assert against.

use crate::paradigm::Paradigm;
use crate::scene::{Cue, IndicatorColor, SceneEngine, SceneObject, Side, Vec3};

use log::debug;
use std::collections::HashSet;

/// In-memory copy of the scene's output state.
#[derive(Debug, Clone, Default)]
pub struct SceneMirror {
    scene: Option<Paradigm>,
    missing: HashSet<SceneObject>,
    fixation_visible: bool,
    center_visible: bool,
    indicator: IndicatorColor,
    positions: [Vec3; 2],
    sharpness: [f32; 2],
    volume: [f32; 2],
    cues: Vec<Cue>,
    frames: u64,
    elapsed: f32,
}

fn index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

impl SceneMirror {
    /// A mirror where every required object is present.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mirror that reports `missing` as unavailable.
    pub fn without(missing: &[SceneObject]) -> Self {
        Self {
            missing: missing.iter().cloned().collect(),
            ..Self::default()
        }
    }

    /// The last scene loaded, if any.
    pub fn scene(&self) -> Option<Paradigm> {
        self.scene
    }

    #[allow(missing_docs)]
    pub fn fixation_visible(&self) -> bool {
        self.fixation_visible
    }

    #[allow(missing_docs)]
    pub fn center_visible(&self) -> bool {
        self.center_visible
    }

    #[allow(missing_docs)]
    pub fn indicator(&self) -> IndicatorColor {
        self.indicator
    }

    #[allow(missing_docs)]
    pub fn position(&self, cube: Side) -> Vec3 {
        self.positions[index(cube)]
    }

    #[allow(missing_docs)]
    pub fn sharpness(&self, cube: Side) -> f32 {
        self.sharpness[index(cube)]
    }

    #[allow(missing_docs)]
    pub fn volume(&self, channel: Side) -> f32 {
        self.volume[index(channel)]
    }

    /// Every cue played so far, oldest first.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Number of frames presented.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Total time presented, in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl SceneEngine for SceneMirror {
    fn load_scene(&mut self, paradigm: Paradigm) {
        debug!("loading scene {}", paradigm.scene_name());
        self.scene = Some(paradigm);
    }

    fn has_object(&self, object: SceneObject) -> bool {
        !self.missing.contains(&object)
    }

    fn set_active(&mut self, object: SceneObject, active: bool) {
        match object {
            SceneObject::FixationCross => self.fixation_visible = active,
            SceneObject::CenterPoint => self.center_visible = active,
            _ => {}
        }
    }

    fn set_position(&mut self, cube: Side, position: Vec3) {
        self.positions[index(cube)] = position;
    }

    fn set_sharpness(&mut self, cube: Side, sharpness: f32) {
        self.sharpness[index(cube)] = sharpness;
    }

    fn set_volume(&mut self, channel: Side, volume: f32) {
        self.volume[index(channel)] = volume;
    }

    fn set_indicator_color(&mut self, color: IndicatorColor) {
        self.indicator = color;
    }

    fn play_cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    fn present(&mut self, dt: f32) -> Result<(), crate::scene::SceneError> {
        self.frames += 1;
        self.elapsed += dt;
        Ok(())
    }
}

impl AsRef<SceneMirror> for SceneMirror {
    fn as_ref(&self) -> &SceneMirror {
        self
    }
}

/// A mirror paired with a second engine, such as the audio recorder.
impl<B: SceneEngine> AsRef<SceneMirror> for (SceneMirror, B) {
    fn as_ref(&self) -> &SceneMirror {
        &self.0
    }
}
