//! A feedback front-end for a brain-computer interface experiment. A decoder
//! and a trial protocol publish onto a message bus; this crate listens to
//! both and turns them into what the participant sees and hears: two cubes
//! that rise, sharpen, or get louder as the decoder favours their side, plus
//! the fixation cross, cues, and the hit/miss indicator.
//!
//! Three paradigms are supported. Motor imagery drives the cubes' height,
//! covert visuospatial attention drives their sharpness and the stereo
//! volume, and the hybrid paradigm drives all three at once.
//!
//! The [`event_mapper`] turns bus messages into scene changes and feedback
//! targets, the [`feedback_renderer`] eases the scene toward those targets
//! once per frame, and a [`session`] ties both to a bus source and a
//! [`scene::SceneEngine`].

#![warn(missing_docs)]
pub mod args;
pub mod audio_recorder;
pub mod bus_message;
pub mod bus_message_decoder;
pub mod bus_source;
pub mod config;
pub mod dummy_bus;
pub mod event_code;
pub mod event_mapper;
pub mod feedback_renderer;
pub mod feedback_state;
pub mod gui;
pub mod line_bus;
pub mod paradigm;
pub mod scene;
pub mod scene_mirror;
pub mod session;
pub mod smooth_damp;
