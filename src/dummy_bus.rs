//! A stand-in for the real decoder and protocol: plays an endless sequence of
//! synthetic trials onto a [`BusSource`], so the feedback can be exercised
//! without an EEG rig.

use crate::bus_message::BusMessage;
use crate::bus_source::BusSource;
use crate::event_code::{self, CueClass, Outcome, CF, FIXATION, OFF};
use crate::paradigm::Paradigm;

use log::{debug, info, warn};
use rand::prelude::*;
use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Seconds between decoder outputs during continuous feedback
const PREDICTION_PERIOD: f32 = 0.0625;

/// Knobs for the synthetic trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialParams {
    /// Probability that the decoder drifts toward the cued class
    pub accuracy: f32,
    /// Amplitude of the uniform noise added to each decoder output
    pub noise: f32,
    /// Multiplies every duration; below 1.0 runs faster than real time
    pub time_scale: f32,
    /// Seconds of continuous feedback per trial
    pub feedback_secs: f32,
}

impl Default for TrialParams {
    fn default() -> Self {
        Self {
            accuracy: 0.7,
            noise: 0.05,
            time_scale: 1.0,
            feedback_secs: 4.0,
        }
    }
}

/// One scheduled message: wait `delay`, then publish `msg`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    #[allow(missing_docs)]
    pub delay: Duration,
    #[allow(missing_docs)]
    pub msg: BusMessage,
}

enum Signal {
    Accuracy(f32),
    Noise(f32),
    Stop,
}

/// A [`BusSource`] that generates trials on its own thread.
pub struct DummyBus {
    handle: Option<thread::JoinHandle<()>>,
    tx: mpsc::Sender<Signal>,
    msgs: Arc<Mutex<VecDeque<BusMessage>>>,
}

impl DummyBus {
    /// Start generating trials for `paradigm`.
    pub fn new(paradigm: Paradigm, params: TrialParams) -> Self {
        let (tx, rx) = mpsc::channel::<Signal>();
        let msgs = Arc::new(Mutex::new(VecDeque::new()));
        let th_msgs = Arc::clone(&msgs);

        let handle = thread::spawn(move || {
            let mut rng = thread_rng();
            let mut params = params;
            let mut trial = 0u64;
            'trials: loop {
                trial += 1;
                debug!("dummy bus: trial {}", trial);
                for step in trial_script(paradigm, &params, &mut rng) {
                    // Waiting on the channel doubles as the sleep
                    match rx.recv_timeout(step.delay) {
                        Ok(Signal::Accuracy(a)) => params.accuracy = a,
                        Ok(Signal::Noise(n)) => params.noise = n,
                        Ok(Signal::Stop) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                            break 'trials
                        }
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                    }
                    th_msgs
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push_back(step.msg);
                }
            }
            info!("dummy bus stopped after {} trials", trial);
        });

        DummyBus {
            handle: Some(handle),
            tx,
            msgs,
        }
    }

    #[allow(missing_docs)]
    pub fn set_accuracy(&self, accuracy: f32) {
        self.signal(Signal::Accuracy(accuracy));
    }

    #[allow(missing_docs)]
    pub fn set_noise(&self, noise: f32) {
        self.signal(Signal::Noise(noise));
    }

    /// Stops the generator thread and waits for it.
    pub fn stop(&mut self) {
        self.signal(Signal::Stop);
        if let Some(thread) = self.handle.take() {
            if thread.join().is_err() {
                warn!("dummy bus thread panicked");
            }
        }
    }

    fn signal(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            warn!("dummy bus thread is gone");
        }
    }
}

impl Drop for DummyBus {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Iterator for DummyBus {
    type Item = BusMessage;
    fn next(&mut self) -> Option<Self::Item> {
        self.msgs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl BusSource for DummyBus {
    fn clear(&mut self) {
        self.msgs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// The cue code a paradigm uses for a class.
pub fn cue_code(paradigm: Paradigm, class: CueClass) -> i32 {
    match (paradigm, class) {
        (_, CueClass::Rest) => event_code::REST,
        (Paradigm::MotorImagery, CueClass::Left) => event_code::CUE_LH_MI,
        (Paradigm::MotorImagery, CueClass::Right) => event_code::CUE_RH_MI,
        (Paradigm::Cvsa, CueClass::Left) => event_code::CUE_BL_CVSA,
        (Paradigm::Cvsa, CueClass::Right) => event_code::CUE_BR_CVSA,
        (Paradigm::Hybrid, CueClass::Left) => event_code::CUE_BH,
        (Paradigm::Hybrid, CueClass::Right) => event_code::CUE_BF,
    }
}

/// Builds the messages of one trial: fixation, cue, continuous feedback with
/// decoder outputs drifting toward one class, outcome, outcome end.
pub fn trial_script<R: Rng>(paradigm: Paradigm, params: &TrialParams, rng: &mut R) -> Vec<Step> {
    let secs = |s: f32| Duration::from_secs_f32((s * params.time_scale).max(0.0));
    let event = |delay: f32, code: i32| Step {
        delay: secs(delay),
        msg: BusMessage::Event(code),
    };

    let cued = if rng.gen_bool(0.5) {
        CueClass::Left
    } else {
        CueClass::Right
    };
    let toward_cue = rng.gen::<f32>() < params.accuracy;
    // Some trials never reach either class
    let reach = if rng.gen_bool(0.8) { 1.0 } else { 0.3 };
    let outcome = match (toward_cue, reach >= 1.0) {
        (_, false) => Outcome::Timeout,
        (true, true) => Outcome::Hit,
        (false, true) => Outcome::Miss,
    };

    let mut steps = vec![
        event(1.0, FIXATION),
        event(2.0, FIXATION + OFF),
        event(0.0, cue_code(paradigm, cued)),
        event(1.0, CF),
    ];

    let n_outputs = (params.feedback_secs / PREDICTION_PERIOD).round() as usize;
    let left_favoured = (cued == CueClass::Left) == toward_cue;
    for i in 1..=n_outputs {
        let progress = i as f32 / n_outputs as f32;
        let drift = 0.5 * reach * progress;
        let noise = if params.noise > 0.0 {
            rng.gen_range(-params.noise..params.noise)
        } else {
            0.0
        };
        let left = (if left_favoured { 0.5 + drift } else { 0.5 - drift }) + noise;
        steps.push(Step {
            delay: secs(PREDICTION_PERIOD),
            msg: BusMessage::Prediction(vec![left, 1.0 - left]),
        });
    }

    steps.push(event(0.0, CF + OFF));
    steps.push(event(0.0, outcome.code()));
    steps.push(event(1.0, outcome.code() + OFF));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_code::{EventKind, CUE_BF, CUE_BH};

    fn kinds(steps: &[Step]) -> Vec<EventKind> {
        steps
            .iter()
            .filter_map(|s| match s.msg {
                BusMessage::Event(code) => Some(EventKind::from_code(code)),
                BusMessage::Prediction(_) => None,
            })
            .collect()
    }

    #[test]
    fn trial_follows_protocol_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = TrialParams::default();
        for _ in 0..20 {
            let steps = trial_script(Paradigm::Cvsa, &params, &mut rng);
            let kinds = kinds(&steps);
            assert_eq!(kinds.len(), 7);
            assert_eq!(kinds[0], EventKind::FixationStart);
            assert_eq!(kinds[1], EventKind::FixationEnd);
            assert!(matches!(kinds[2], EventKind::Cue(_)));
            assert_eq!(kinds[3], EventKind::FeedbackStart);
            assert_eq!(kinds[4], EventKind::FeedbackEnd);
            match (kinds[5], kinds[6]) {
                (EventKind::Outcome(a), EventKind::OutcomeEnd(b)) => assert_eq!(a, b),
                other => panic!("unexpected outcome pair {:?}", other),
            }
        }
    }

    #[test]
    fn predictions_drift_toward_cue_when_accurate() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = TrialParams {
            accuracy: 1.0,
            noise: 0.0,
            ..TrialParams::default()
        };
        for _ in 0..20 {
            let steps = trial_script(Paradigm::Hybrid, &params, &mut rng);
            let cue = match steps[2].msg {
                BusMessage::Event(code) => code,
                _ => panic!("third step should be the cue"),
            };
            assert!(cue == CUE_BH || cue == CUE_BF);
            let last = steps
                .iter()
                .rev()
                .find_map(|s| match &s.msg {
                    BusMessage::Prediction(p) => Some(p.clone()),
                    _ => None,
                })
                .unwrap();
            assert!((last[0] + last[1] - 1.0).abs() < 1e-6);
            if cue == CUE_BH {
                assert!(last[0] > 0.5);
            } else {
                assert!(last[1] > 0.5);
            }
        }
    }

    #[test]
    fn cue_codes_per_paradigm() {
        assert_eq!(cue_code(Paradigm::MotorImagery, CueClass::Left), 769);
        assert_eq!(cue_code(Paradigm::MotorImagery, CueClass::Right), 770);
        assert_eq!(cue_code(Paradigm::Cvsa, CueClass::Left), 730);
        assert_eq!(cue_code(Paradigm::Cvsa, CueClass::Right), 731);
        assert_eq!(cue_code(Paradigm::Hybrid, CueClass::Left), 771);
        assert_eq!(cue_code(Paradigm::Hybrid, CueClass::Right), 773);
        assert_eq!(cue_code(Paradigm::Cvsa, CueClass::Rest), 783);
    }

    #[test]
    fn thread_publishes_and_stops() {
        let params = TrialParams {
            time_scale: 0.001,
            ..TrialParams::default()
        };
        let mut bus = DummyBus::new(Paradigm::MotorImagery, params);
        thread::sleep(Duration::from_millis(100));
        bus.stop();

        let msgs: Vec<_> = bus.by_ref().collect();
        assert!(!msgs.is_empty());
        assert_eq!(msgs[0], BusMessage::Event(FIXATION));
    }
}
