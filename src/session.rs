//! A feedback session: one paradigm, one engine, one [`FeedbackState`].
//!
//! Bus sources run on their own threads and only queue messages. The frame
//! loop drains the queue and then ticks the renderer, so the state has a
//! single writer and a frame always sees whole predictions.

use crate::bus_message::BusMessage;
use crate::bus_source::BusSource;
use crate::config::SessionConfig;
use crate::event_mapper::EventMapper;
use crate::feedback_renderer::FeedbackRenderer;
use crate::feedback_state::FeedbackState;
use crate::paradigm::Modality;
use crate::scene::{SceneEngine, SceneError, SceneObject, Side};

use log::{debug, error, info};
use std::{
    error::Error,
    fmt,
    time::{Duration, Instant},
};

/// Why a session could not start or had to stop.
#[derive(Debug)]
pub enum SessionError {
    /// Required scene objects are missing; the session cannot start.
    MissingObjects(Vec<SceneObject>),
    /// The engine failed while presenting a frame.
    Scene(SceneError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingObjects(objects) => {
                let names: Vec<String> = objects.iter().map(|o| o.to_string()).collect();
                write!(f, "missing scene objects: {}", names.join(", "))
            }
            SessionError::Scene(e) => write!(f, "scene error: {}", e),
        }
    }
}

impl Error for SessionError {}

impl From<SceneError> for SessionError {
    fn from(value: SceneError) -> Self {
        Self::Scene(value)
    }
}

/// A running session.
pub struct Session<E: SceneEngine> {
    config: SessionConfig,
    state: FeedbackState,
    mapper: EventMapper,
    renderer: FeedbackRenderer,
    engine: E,
}

impl<E: SceneEngine> Session<E> {
    /// Loads the paradigm's scene, checks that everything the session needs
    /// is there, and puts the scene in its starting state.
    pub fn start(config: SessionConfig, mut engine: E) -> Result<Self, SessionError> {
        let paradigm = config.paradigm;
        info!("starting {} session in scene {}", paradigm, paradigm.scene_name());
        engine.load_scene(paradigm);

        let missing: Vec<SceneObject> = SceneObject::REQUIRED
            .iter()
            .cloned()
            .filter(|o| !engine.has_object(*o))
            .collect();
        if !missing.is_empty() {
            let err = SessionError::MissingObjects(missing);
            error!("{}", err);
            return Err(err);
        }

        let mapper = EventMapper::new(&config);
        let renderer = FeedbackRenderer::new(&config);

        engine.set_active(SceneObject::FixationCross, false);
        engine.set_active(SceneObject::CenterPoint, false);
        mapper.reset_modality(&mut engine, Modality::Position);
        if paradigm.drives(Modality::Material) {
            for &modality in paradigm.modalities() {
                if modality != Modality::Position {
                    mapper.reset_modality(&mut engine, modality);
                }
            }
        } else {
            for side in Side::BOTH {
                engine.set_sharpness(side, config.sharpness.static_level);
            }
        }

        Ok(Self {
            config,
            state: FeedbackState::new(),
            mapper,
            renderer,
            engine,
        })
    }

    /// Routes one bus message to the event mapper.
    pub fn handle(&mut self, msg: &BusMessage) {
        match msg {
            BusMessage::Prediction(sample) => self.mapper.on_prediction(&mut self.state, sample),
            BusMessage::Event(code) => {
                self.mapper
                    .on_event(&mut self.state, &mut self.engine, *code)
            }
        }
    }

    /// Handles every message currently queued on `source`. Returns how many
    /// there were.
    pub fn drain<S: BusSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut n = 0;
        while let Some(msg) = source.next() {
            self.handle(&msg);
            n += 1;
        }
        n
    }

    /// Renders one frame, `dt` seconds after the last, and presents it.
    pub fn frame(&mut self, dt: f32) -> Result<(), SessionError> {
        self.renderer.tick(&mut self.state, &mut self.engine, dt);
        self.engine.present(dt)?;
        Ok(())
    }

    /// Runs frames at the configured rate until `source` has ended and been
    /// drained, or `stop` returns true. Returns the number of frames run.
    pub fn run<S, F>(&mut self, source: &mut S, mut stop: F) -> Result<u64, SessionError>
    where
        S: BusSource + ?Sized,
        F: FnMut(&Self) -> bool,
    {
        let period = Duration::from_secs_f32(1.0 / self.config.frame_rate.max(1.0));
        let mut frames = 0u64;
        let mut last = Instant::now();

        loop {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last).as_secs_f32();
            last = frame_start;

            // Checked before draining so nothing can arrive unseen
            let finished = source.is_finished();
            let handled = self.drain(source);
            if handled > 0 {
                debug!("frame {}: {} bus messages", frames, handled);
            }
            self.frame(dt)?;
            frames += 1;

            if finished || stop(self) {
                break;
            }
            if let Some(rest) = period.checked_sub(frame_start.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }

        info!("session ended after {} frames", frames);
        Ok(frames)
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    #[allow(missing_docs)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[allow(missing_docs)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Ends the session, handing back the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_source::ScriptedBus;
    use crate::event_code::*;
    use crate::paradigm::Paradigm;
    use crate::scene::{IndicatorColor, Vec3};
    use crate::scene_mirror::SceneMirror;

    fn config(paradigm: Paradigm) -> SessionConfig {
        SessionConfig {
            paradigm,
            frame_rate: 1000.0,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn missing_objects_stop_the_session() {
        let engine = SceneMirror::without(&[
            SceneObject::CenterPoint,
            SceneObject::CueClip(CueClass::Rest),
        ]);
        match Session::start(config(Paradigm::Cvsa), engine) {
            Err(SessionError::MissingObjects(missing)) => assert_eq!(
                missing,
                vec![SceneObject::CenterPoint, SceneObject::CueClip(CueClass::Rest)]
            ),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("session started without its objects"),
        }
    }

    #[test]
    fn motor_imagery_starting_scene() {
        let session = Session::start(config(Paradigm::MotorImagery), SceneMirror::new()).unwrap();
        let scene = session.engine();
        assert_eq!(scene.scene(), Some(Paradigm::MotorImagery));
        assert!(!scene.fixation_visible());
        assert!(!scene.center_visible());
        assert_eq!(scene.position(Side::Left), Vec3::new(-1.5, 1.65, 4.0));
        assert_eq!(scene.position(Side::Right), Vec3::new(1.5, 1.65, 4.0));
        assert_eq!(scene.sharpness(Side::Left), 1.0);
        assert_eq!(scene.sharpness(Side::Right), 1.0);
        assert!(!session.state().in_feedback_period);
    }

    #[test]
    fn cvsa_starting_scene() {
        let mut engine = SceneMirror::new();
        engine.set_volume(Side::Left, 0.7);
        let session = Session::start(config(Paradigm::Cvsa), engine).unwrap();
        let scene = session.engine();
        assert_eq!(scene.position(Side::Left), Vec3::new(-1.5, 1.65, 4.0));
        assert_eq!(scene.sharpness(Side::Left), 0.5);
        assert_eq!(scene.sharpness(Side::Right), 0.5);
        assert_eq!(scene.volume(Side::Left), 0.0);
    }

    #[test]
    fn hybrid_starting_scene() {
        let mut engine = SceneMirror::new();
        engine.set_volume(Side::Right, 0.9);
        engine.set_sharpness(Side::Left, 0.2);
        let session = Session::start(config(Paradigm::Hybrid), engine).unwrap();
        let scene = session.engine();
        assert_eq!(scene.scene(), Some(Paradigm::Hybrid));
        assert!(!scene.fixation_visible());
        assert!(!scene.center_visible());
        for side in Side::BOTH {
            assert_eq!(scene.position(side), config(Paradigm::Hybrid).layout.baseline(side));
            assert_eq!(scene.sharpness(side), 0.5);
            assert_eq!(scene.volume(side), 0.0);
        }
    }

    #[test]
    fn scripted_motor_imagery_trial() {
        let mut session =
            Session::start(config(Paradigm::MotorImagery), SceneMirror::new()).unwrap();
        let mut bus = ScriptedBus::new(vec![
            BusMessage::Event(FIXATION),
            BusMessage::Event(FIXATION + OFF),
            BusMessage::Event(CUE_LH_MI),
            BusMessage::Event(CF),
            BusMessage::Prediction(vec![0.8, 0.3]),
        ]);
        session.drain(&mut bus);
        for _ in 0..120 {
            session.frame(1.0 / 60.0).unwrap();
        }

        let scene = session.engine();
        assert!(!scene.fixation_visible());
        assert!(scene.center_visible());
        assert_eq!(scene.cues(), &[CueClass::Left]);
        assert!((scene.position(Side::Left).y - 2.25).abs() < 1e-3);
        assert_eq!(scene.position(Side::Right).y, 1.65);

        session.handle(&BusMessage::Event(CF + OFF));
        session.handle(&BusMessage::Event(HIT));
        assert_eq!(session.engine().indicator(), IndicatorColor::Success);
        session.handle(&BusMessage::Event(HIT + OFF));

        let scene = session.engine();
        assert!(!scene.center_visible());
        assert_eq!(scene.indicator(), IndicatorColor::Default);
        assert_eq!(scene.position(Side::Left), Vec3::new(-1.5, 1.65, 4.0));
        assert_eq!(scene.position(Side::Right), Vec3::new(1.5, 1.65, 4.0));
    }

    #[test]
    fn run_stops_when_scripted_feed_is_drained() {
        let mut session = Session::start(config(Paradigm::Hybrid), SceneMirror::new()).unwrap();
        let mut bus = ScriptedBus::new(vec![
            BusMessage::Event(CF),
            BusMessage::Prediction(vec![0.9, 0.1]),
        ]);
        let frames = session.run(&mut bus, |_| false).unwrap();
        assert_eq!(frames, 1);
        assert!(session.state().in_feedback_period);
        assert_eq!(session.state().targets(), (0.9, 0.1));
        assert_eq!(session.into_engine().frames(), 1);
    }

    /// A feed that never reports that it has ended
    struct OpenBus(ScriptedBus);

    impl Iterator for OpenBus {
        type Item = BusMessage;
        fn next(&mut self) -> Option<Self::Item> {
            self.0.next()
        }
    }

    impl BusSource for OpenBus {
        fn clear(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn run_stops_on_request() {
        let mut session = Session::start(config(Paradigm::Cvsa), SceneMirror::new()).unwrap();
        let mut bus = OpenBus(ScriptedBus::new(vec![
            BusMessage::Event(CF),
            BusMessage::Prediction(vec![0.9, 0.1]),
        ]));
        let frames = session
            .run(&mut bus, |s| s.engine().elapsed() >= 1.0)
            .unwrap();
        assert!(frames > 1);
        assert!(session.state().current_left > 0.85);
        assert!((session.engine().volume(Side::Left) - session.state().current_left).abs() < 1e-6);
    }
}
