//! Watches synthetic trials play out in the terminal. Handy for checking the
//! feedback without a decoder or a headset.

use bcifeedback::{
    config::SessionConfig,
    dummy_bus::{DummyBus, TrialParams},
    gui,
    scene_mirror::SceneMirror,
    session::Session,
};

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let paradigm = match gui::paradigm_selector()? {
        Some(paradigm) => paradigm,
        None => return Ok(()),
    };
    let config = SessionConfig {
        paradigm,
        ..SessionConfig::default()
    };

    let mut bus = DummyBus::new(paradigm, TrialParams::default());
    let mut session = Session::start(config, SceneMirror::new())?;
    gui::monitor(&mut session, &mut bus)?;

    bus.stop();
    Ok(())
}
