//! Turns bus traffic into feedback state and one-shot scene effects.
//!
//! Predictions only update the raw targets; the renderer picks them up on
//! the next frame. Events are dispatched on their [`EventKind`]: anything
//! outside the vocabulary is silently ignored.

use crate::config::{CubeLayout, SessionConfig, SharpnessLevels};
use crate::event_code::{EventKind, Outcome};
use crate::feedback_state::FeedbackState;
use crate::paradigm::{Modality, Paradigm};
use crate::scene::{IndicatorColor, SceneEngine, SceneObject, Side};

use log::{debug, info};

/// Reacts to `/cvsa/neuroprediction/integrated` and `/events/bus`.
#[derive(Debug, Clone)]
pub struct EventMapper {
    paradigm: Paradigm,
    layout: CubeLayout,
    sharpness: SharpnessLevels,
}

impl EventMapper {
    /// A mapper for the paradigm and scene described by `config`.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            paradigm: config.paradigm,
            layout: config.layout,
            sharpness: config.sharpness,
        }
    }

    #[allow(missing_docs)]
    pub fn paradigm(&self) -> Paradigm {
        self.paradigm
    }

    /// Stores elements 0 and 1 of `sample` as the left and right targets.
    /// Samples with fewer than two elements are dropped. Values are taken
    /// as-is, without clamping.
    pub fn on_prediction(&self, state: &mut FeedbackState, sample: &[f32]) {
        if let [left, right, ..] = sample {
            state.target_left = *left;
            state.target_right = *right;
        }
    }

    /// Applies the effect of one event code.
    pub fn on_event<E: SceneEngine>(&self, state: &mut FeedbackState, engine: &mut E, code: i32) {
        let kind = EventKind::from_code(code);
        debug!("event {} -> {:?}", code, kind);

        match kind {
            EventKind::FixationStart => engine.set_active(SceneObject::FixationCross, true),
            EventKind::FixationEnd => engine.set_active(SceneObject::FixationCross, false),
            EventKind::Cue(cue) => {
                engine.set_active(SceneObject::CenterPoint, true);
                engine.play_cue(cue);
            }
            EventKind::FeedbackStart => {
                info!("continuous feedback started");
                state.in_feedback_period = true;
            }
            EventKind::FeedbackEnd => {
                info!("continuous feedback ended");
                state.in_feedback_period = false;
            }
            EventKind::Outcome(outcome) => {
                info!("trial outcome: {:?}", outcome);
                engine.set_indicator_color(outcome_color(outcome));
            }
            EventKind::OutcomeEnd(_) => {
                engine.set_active(SceneObject::CenterPoint, false);
                engine.set_indicator_color(IndicatorColor::Default);
                for &modality in self.paradigm.modalities() {
                    self.reset_modality(engine, modality);
                }
            }
            EventKind::Ignored => {}
        }
    }

    /// Puts one modality back to its resting output.
    pub fn reset_modality<E: SceneEngine>(&self, engine: &mut E, modality: Modality) {
        for side in Side::BOTH {
            match modality {
                Modality::Position => engine.set_position(side, self.layout.baseline(side)),
                Modality::Material => {
                    engine.set_sharpness(side, self.sharpness.feedback_baseline)
                }
                Modality::Audio => engine.set_volume(side, 0.0),
            }
        }
    }
}

fn outcome_color(outcome: Outcome) -> IndicatorColor {
    match outcome {
        Outcome::Hit => IndicatorColor::Success,
        Outcome::Miss => IndicatorColor::Failure,
        Outcome::Timeout => IndicatorColor::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_code::*;
    use crate::scene::Vec3;
    use crate::scene_mirror::SceneMirror;
    use rand::Rng;

    fn mapper(paradigm: Paradigm) -> EventMapper {
        EventMapper::new(&SessionConfig {
            paradigm,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn prediction_is_identity_on_first_two() {
        let mapper = mapper(Paradigm::MotorImagery);
        let mut state = FeedbackState::new();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let len = rng.gen_range(2..6);
            let sample: Vec<f32> = (0..len).map(|_| rng.gen_range(-2.0..2.0)).collect();
            mapper.on_prediction(&mut state, &sample);
            assert_eq!(state.targets(), (sample[0], sample[1]));
        }
    }

    #[test]
    fn short_prediction_is_dropped() {
        let mapper = mapper(Paradigm::Cvsa);
        let mut state = FeedbackState::new();
        mapper.on_prediction(&mut state, &[0.4, 0.6]);
        let before = state.clone();

        mapper.on_prediction(&mut state, &[]);
        mapper.on_prediction(&mut state, &[0.9]);
        assert_eq!(state, before);
    }

    #[test]
    fn out_of_range_predictions_pass_through() {
        let mapper = mapper(Paradigm::Cvsa);
        let mut state = FeedbackState::new();
        mapper.on_prediction(&mut state, &[1.7, -0.4]);
        assert_eq!(state.targets(), (1.7, -0.4));
        mapper.on_prediction(&mut state, &[f32::NAN, 0.5]);
        assert!(state.target_left.is_nan());
    }

    #[test]
    fn feedback_period_follows_cf_codes() {
        let mapper = mapper(Paradigm::MotorImagery);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();

        mapper.on_event(&mut state, &mut scene, CF);
        assert!(state.in_feedback_period);
        mapper.on_event(&mut state, &mut scene, FIXATION);
        assert!(state.in_feedback_period);
        mapper.on_event(&mut state, &mut scene, CF + OFF);
        assert!(!state.in_feedback_period);
    }

    #[test]
    fn cues_show_center_and_play_clip() {
        let mapper = mapper(Paradigm::Hybrid);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();

        for code in [CUE_LH_MI, CUE_BR_CVSA, REST, CUE_BH, CUE_BF] {
            mapper.on_event(&mut state, &mut scene, code);
        }
        assert!(scene.center_visible());
        assert_eq!(
            scene.cues(),
            &[
                CueClass::Left,
                CueClass::Right,
                CueClass::Rest,
                CueClass::Left,
                CueClass::Right
            ]
        );
    }

    #[test]
    fn visibility_round_trips() {
        let mapper = mapper(Paradigm::MotorImagery);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();

        mapper.on_event(&mut state, &mut scene, FIXATION);
        assert!(scene.fixation_visible());
        mapper.on_event(&mut state, &mut scene, FIXATION + OFF);
        assert!(!scene.fixation_visible());

        for outcome in [HIT, MISS, TIMEOUT] {
            mapper.on_event(&mut state, &mut scene, CUE_LH_MI);
            mapper.on_event(&mut state, &mut scene, outcome);
            assert!(scene.center_visible());
            mapper.on_event(&mut state, &mut scene, outcome + OFF);
            assert!(!scene.center_visible());
            assert_eq!(scene.indicator(), IndicatorColor::Default);
        }
    }

    #[test]
    fn outcome_colors() {
        let mapper = mapper(Paradigm::Cvsa);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();

        mapper.on_event(&mut state, &mut scene, HIT);
        assert_eq!(scene.indicator(), IndicatorColor::Success);
        mapper.on_event(&mut state, &mut scene, MISS);
        assert_eq!(scene.indicator(), IndicatorColor::Failure);
        mapper.on_event(&mut state, &mut scene, TIMEOUT);
        assert_eq!(scene.indicator(), IndicatorColor::Warning);
    }

    #[test]
    fn hit_end_resets_positions_for_motor_imagery() {
        let mapper = mapper(Paradigm::MotorImagery);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();
        scene.set_position(Side::Left, Vec3::new(-1.5, 2.4, 4.0));
        scene.set_sharpness(Side::Left, 0.9);
        scene.set_volume(Side::Left, 0.9);

        mapper.on_event(&mut state, &mut scene, HIT);
        mapper.on_event(&mut state, &mut scene, HIT + OFF);

        assert_eq!(scene.position(Side::Left), Vec3::new(-1.5, 1.65, 4.0));
        assert_eq!(scene.position(Side::Right), Vec3::new(1.5, 1.65, 4.0));
        // Not driven by this paradigm, so left alone
        assert_eq!(scene.sharpness(Side::Left), 0.9);
        assert_eq!(scene.volume(Side::Left), 0.9);
    }

    #[test]
    fn miss_end_resets_material_and_audio_for_cvsa() {
        let mapper = mapper(Paradigm::Cvsa);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();
        let lifted = Vec3::new(-1.5, 2.4, 4.0);
        scene.set_position(Side::Left, lifted);
        for side in Side::BOTH {
            scene.set_sharpness(side, 0.9);
            scene.set_volume(side, 0.8);
        }

        mapper.on_event(&mut state, &mut scene, MISS + OFF);

        for side in Side::BOTH {
            assert_eq!(scene.sharpness(side), 0.5);
            assert_eq!(scene.volume(side), 0.0);
        }
        assert_eq!(scene.position(Side::Left), lifted);
    }

    #[test]
    fn timeout_end_resets_everything_for_hybrid() {
        let mapper = mapper(Paradigm::Hybrid);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();
        scene.set_position(Side::Right, Vec3::new(1.5, 2.0, 4.0));
        scene.set_sharpness(Side::Right, 0.1);
        scene.set_volume(Side::Right, 0.3);

        mapper.on_event(&mut state, &mut scene, TIMEOUT + OFF);

        assert_eq!(scene.position(Side::Right), Vec3::new(1.5, 1.65, 4.0));
        assert_eq!(scene.sharpness(Side::Right), 0.5);
        assert_eq!(scene.volume(Side::Right), 0.0);
    }

    #[test]
    fn unknown_code_changes_nothing() {
        let mapper = mapper(Paradigm::Hybrid);
        let mut state = FeedbackState::new();
        let mut scene = SceneMirror::new();
        mapper.on_prediction(&mut state, &[0.2, 0.7]);
        let state_before = state.clone();

        mapper.on_event(&mut state, &mut scene, 999999);

        assert_eq!(state, state_before);
        assert!(!scene.center_visible());
        assert!(!scene.fixation_visible());
        assert!(scene.cues().is_empty());
        assert_eq!(scene.indicator(), IndicatorColor::Default);
    }
}
