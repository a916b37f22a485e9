//! Runs a feedback session from the command line.

use bcifeedback::{
    args::{CommandTask, FeedbackArgs, OutputArgs},
    audio_recorder::{AudioRecorder, CueBank},
    bus_source::BusSource,
    config::SessionConfig,
    dummy_bus::{DummyBus, TrialParams},
    gui,
    line_bus::{LineBus, Pacing},
    scene::SceneEngine,
    scene_mirror::SceneMirror,
    session::Session,
};

use clap::Parser;
use log::info;
use std::error::Error;

// Example:
// RUST_LOG=info cargo run --bin bcifeedback --
//                            --paradigm  cvsa
//                            replay
//                            --file      session.bus
//                            --realtime
//                            --record    feedback.wav
//                            --cue-left  left.wav
//                            --cue-right right.wav
//                            --cue-rest  rest.wav

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = FeedbackArgs::parse();
    if let Err(e) = args.validate() {
        e.exit();
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("loading session settings from {}", path.display());
            SessionConfig::from_path(path)?
        }
        None => SessionConfig::default(),
    };
    if let Some(smooth_time) = args.smooth_time {
        config.smooth_time = smooth_time;
    }
    if let Some(frame_rate) = args.frame_rate {
        config.frame_rate = frame_rate;
    }
    match (args.paradigm, &args.config) {
        (Some(paradigm), _) => config.paradigm = paradigm,
        (None, Some(_)) => {}
        (None, None) => match gui::paradigm_selector()? {
            Some(paradigm) => config.paradigm = paradigm,
            None => return Ok(()),
        },
    }

    let mut duration = None;
    let mut source: Box<dyn BusSource> = match &args.command {
        CommandTask::Listen(_) => Box::new(LineBus::stdin()),
        CommandTask::Replay(cmd) => {
            let pacing = if cmd.realtime {
                Pacing::Realtime
            } else {
                Pacing::Immediate
            };
            Box::new(LineBus::from_path(&cmd.file, pacing)?)
        }
        CommandTask::Demo(cmd) => {
            duration = cmd.duration;
            let params = TrialParams {
                accuracy: cmd.accuracy,
                noise: cmd.noise,
                ..TrialParams::default()
            };
            Box::new(DummyBus::new(config.paradigm, params))
        }
    };

    let output = args.command.output();
    match &output.record {
        Some(path) => {
            let bank = CueBank::load(
                output.cue_left.as_deref(),
                output.cue_right.as_deref(),
                output.cue_rest.as_deref(),
            );
            let recorder = AudioRecorder::create(path, bank)?;
            let (_, mut recorder) =
                run(config, (SceneMirror::new(), recorder), source.as_mut(), output, duration)?;
            recorder.finalize()?;
            info!("audio feedback written to {}", path.display());
        }
        None => {
            run(config, SceneMirror::new(), source.as_mut(), output, duration)?;
        }
    }

    Ok(())
}

/// Runs one session to completion and hands back the engine.
fn run<E>(
    config: SessionConfig,
    engine: E,
    source: &mut dyn BusSource,
    output: &OutputArgs,
    duration: Option<f32>,
) -> Result<E, Box<dyn Error>>
where
    E: SceneEngine + AsRef<SceneMirror>,
{
    let mut session = Session::start(config, engine)?;
    let frames = if output.monitor {
        gui::monitor(&mut session, source)?
    } else {
        session.run(source, |s| match duration {
            Some(secs) => s.engine().as_ref().elapsed() >= secs,
            None => false,
        })?
    };
    info!("{} frames rendered", frames);
    Ok(session.into_engine())
}
