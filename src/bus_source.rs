use crate::bus_message::BusMessage;

/// `BusSource`
///
/// A clearable iterator that emits the `BusMessage`s received since it was
/// last drained. `next()` returning `None` only means nothing is pending
/// right now; `is_finished()` says whether anything more can ever arrive.
pub trait BusSource: Iterator<Item = BusMessage> {
    /// Drops every pending message.
    fn clear(&mut self);

    /// True once the feed has ended. Pending messages may still be queued.
    fn is_finished(&self) -> bool {
        false
    }
}

/// A fixed list of messages, delivered all at once. Handy for scripted
/// sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBus {
    msgs: std::collections::VecDeque<BusMessage>,
}

impl ScriptedBus {
    #[allow(missing_docs)]
    pub fn new(msgs: impl IntoIterator<Item = BusMessage>) -> Self {
        Self {
            msgs: msgs.into_iter().collect(),
        }
    }
}

impl Iterator for ScriptedBus {
    type Item = BusMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.msgs.pop_front()
    }
}

impl BusSource for ScriptedBus {
    fn clear(&mut self) {
        self.msgs.clear();
    }

    fn is_finished(&self) -> bool {
        true
    }
}
