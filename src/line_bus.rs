//! The thread-safe buffer where we store [`BusMessage`]s decoded from a
//! line-oriented feed: a bridge process piped into stdin, or a recording
//! being replayed.

use crate::bus_message::BusMessage;
use crate::bus_message_decoder::decode_line;
use crate::bus_source::BusSource;

use log::{debug, info, warn};
use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Whether replay stamps are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Deliver each line as soon as it is read
    Immediate,
    /// Hold each stamped line until its time since the feed started
    Realtime,
}

/// A [`BusSource`] fed by a reader thread. The reader thread is the only
/// producer and the frame loop the only consumer, so messages come out in
/// the order they were read.
#[derive(Debug)]
pub struct LineBus {
    msgs: Arc<Mutex<VecDeque<BusMessage>>>,
    finished: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LineBus {
    /// Start reading `reader` on its own thread.
    pub fn spawn<R>(reader: R, pacing: Pacing) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let msgs = Arc::new(Mutex::new(VecDeque::new()));
        let finished = Arc::new(AtomicBool::new(false));
        let th_msgs = Arc::clone(&msgs);
        let th_finished = Arc::clone(&finished);

        let handle = thread::spawn(move || {
            let _finished = FinishOnDrop(th_finished);
            let mut reader = reader;
            let mut buf = Vec::new();
            let start = Instant::now();
            let mut line_no = 0;
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => line_no += 1,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("bus feed read failed: {}", e);
                        break;
                    }
                }
                // Bytes that are not UTF-8 fail to decode below, like any
                // other garbage line
                let line = String::from_utf8_lossy(&buf);
                match decode_line(&line) {
                    Ok(Some(stamped)) => {
                        if let (Pacing::Realtime, Some(at)) = (pacing, stamped.at) {
                            hold_until(start, at, line_no);
                        }
                        debug!("received {}", stamped.message);
                        push(&th_msgs, stamped.message);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("line {}: unable to decode bus message: {:?}", line_no, e);
                    }
                }
            }
            info!("bus feed ended");
        });

        LineBus {
            msgs,
            finished,
            handle: Some(handle),
        }
    }

    /// Read bus lines from standard input.
    pub fn stdin() -> Self {
        Self::spawn(BufReader::new(io::stdin()), Pacing::Immediate)
    }

    /// Replay a recorded bus feed.
    pub fn from_path(path: impl AsRef<Path>, pacing: Pacing) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::spawn(BufReader::new(file), pacing))
    }

    /// Insert a message as if it had been read from the feed.
    pub fn push(&self, msg: BusMessage) {
        push(&self.msgs, msg);
    }

    /// Wait for the reader thread to reach the end of its feed.
    pub fn join(&mut self) {
        if let Some(thread) = self.handle.take() {
            if thread.join().is_err() {
                warn!("bus reader thread panicked");
            }
        }
    }
}

/// Marks the feed finished when the reader thread exits, however it exits.
struct FinishOnDrop(Arc<AtomicBool>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Sleeps until `at` seconds after `start`. A stamp too large to wait for
/// is delivered right away.
fn hold_until(start: Instant, at: f64, line_no: usize) {
    match Duration::try_from_secs_f64(at.max(0.0)) {
        Ok(due) => {
            if let Some(wait) = due.checked_sub(start.elapsed()) {
                thread::sleep(wait);
            }
        }
        Err(_) => warn!("line {}: stamp @{} is out of range, not waiting", line_no, at),
    }
}

fn push(msgs: &Mutex<VecDeque<BusMessage>>, msg: BusMessage) {
    msgs.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(msg);
}

impl Iterator for LineBus {
    type Item = BusMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.msgs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl BusSource for LineBus {
    fn clear(&mut self) {
        self.msgs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
