//! Messages arriving from the two subscribed topics.

use std::fmt;

/// Continuous two-class decoder output; only the first two elements of
/// `softpredict.data` are used.
pub const PREDICTION_TOPIC: &str = "/cvsa/neuroprediction/integrated";

/// Discrete protocol events; a single integer `event` field.
pub const EVENT_TOPIC: &str = "/events/bus";

/// One message from the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    /// The `softpredict.data` vector of a decoder output
    Prediction(Vec<f32>),
    /// The `event` code of a bus event
    Event(i32),
}

impl BusMessage {
    /// The topic this message was published on.
    pub fn topic(&self) -> &'static str {
        match self {
            BusMessage::Prediction(_) => PREDICTION_TOPIC,
            BusMessage::Event(_) => EVENT_TOPIC,
        }
    }
}

/// A message with an optional replay time, in seconds from the start of
/// the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedMessage {
    #[allow(missing_docs)]
    pub at: Option<f64>,
    #[allow(missing_docs)]
    pub message: BusMessage,
}

impl From<BusMessage> for StampedMessage {
    fn from(message: BusMessage) -> Self {
        Self { at: None, message }
    }
}

// Formats in the same line syntax the decoder reads.
impl fmt::Display for BusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusMessage::Event(code) => write!(f, "{} event={}", EVENT_TOPIC, code),
            BusMessage::Prediction(data) => {
                let items: Vec<String> = data.iter().map(|v| v.to_string()).collect();
                write!(f, "{} softpredict.data=[{}]", PREDICTION_TOPIC, items.join(", "))
            }
        }
    }
}

impl fmt::Display for StampedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.at {
            Some(at) => write!(f, "@{:.3} {}", at, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
