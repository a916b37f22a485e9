//! Per-frame feedback: smooth the targets, then, during a feedback period,
//! push the smoothed values into every modality the paradigm drives.

use crate::config::{CubeLayout, SessionConfig};
use crate::feedback_state::FeedbackState;
use crate::paradigm::{Modality, Paradigm};
use crate::scene::{SceneEngine, Side};

/// Runs once per display frame. Never decides its own cadence.
#[derive(Debug, Clone)]
pub struct FeedbackRenderer {
    paradigm: Paradigm,
    layout: CubeLayout,
    smooth_time: f32,
}

impl FeedbackRenderer {
    /// A renderer for the paradigm and scene described by `config`.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            paradigm: config.paradigm,
            layout: config.layout,
            smooth_time: config.smooth_time,
        }
    }

    /// Advances one frame, `dt` seconds after the previous one.
    ///
    /// Smoothing always runs, so the values keep tracking the targets while
    /// feedback is off and there is no jump when it resumes.
    pub fn tick<E: SceneEngine>(&self, state: &mut FeedbackState, engine: &mut E, dt: f32) {
        state.current_left = state.smoothing_left.step(
            state.current_left,
            state.target_left,
            self.smooth_time,
            dt,
        );
        state.current_right = state.smoothing_right.step(
            state.current_right,
            state.target_right,
            self.smooth_time,
            dt,
        );

        if !state.in_feedback_period {
            return;
        }

        for &modality in self.paradigm.modalities() {
            self.apply(engine, modality, state.current_left, Side::Left);
            self.apply(engine, modality, state.current_right, Side::Right);
        }
    }

    fn apply<E: SceneEngine>(&self, engine: &mut E, modality: Modality, value: f32, side: Side) {
        match modality {
            Modality::Position => engine.set_position(side, self.layout.lifted(side, value)),
            Modality::Material => engine.set_sharpness(side, value),
            Modality::Audio => engine.set_volume(side, value),
        }
    }
}
