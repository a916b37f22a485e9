//! Terminal screens: the paradigm menu shown at startup and the live
//! session monitor.

mod error;
mod monitor;
mod paradigm_selector;

pub use error::GuiError;
pub use monitor::monitor;
pub use paradigm_selector::paradigm_selector;
