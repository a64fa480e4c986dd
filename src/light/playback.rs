//! Fixed-rate playback of a compiled frame sequence.
//!
//! Each running light owns a ticker thread. The thread sleeps until the next
//! absolute deadline (`epoch + k * tick`) so timing never drifts, and picks the
//! frame from elapsed wall-clock time rather than counting ticks.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace};

use super::Shared;
use crate::compiler::{Frame, Timing};
use crate::host::CommandSink;

/// What a tick should do with the frame it selected.
#[derive(Debug, PartialEq)]
pub enum Step<'a> {
    /// Same frame as last tick.
    Unchanged,
    /// New frame, but its command was already sent.
    Color(&'a Frame),
    /// New frame with a new command.
    Write(&'a Frame),
}

/// Remembers what the previous tick showed and sent.
#[derive(Debug, Default)]
pub struct Cursor {
    last_index: Option<usize>,
    last_command: Option<String>,
}

impl Cursor {
    pub fn new() -> Cursor {
        Cursor::default()
    }

    /// Frame index for an absolute tick number.
    pub fn index(frames: &[Frame], tick: u64) -> usize {
        (tick % frames.len() as u64) as usize
    }

    /// Select the frame for `tick` and decide what needs doing.
    pub fn advance<'a>(&mut self, frames: &'a [Frame], tick: u64) -> Step<'a> {
        if frames.is_empty() {
            return Step::Unchanged;
        }

        let index = Cursor::index(frames, tick);
        if self.last_index == Some(index) {
            return Step::Unchanged;
        }
        self.last_index = Some(index);

        let frame = &frames[index];
        if self.last_command.as_deref() == Some(frame.command()) {
            return Step::Color(frame);
        }
        self.last_command = Some(frame.command().to_owned());
        Step::Write(frame)
    }
}

/// Handle to a running ticker thread. Dropping it stops the thread.
pub(super) struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub(super) fn start(
        name: Arc<String>,
        shared: Arc<Mutex<Shared>>,
        sink: Arc<dyn CommandSink>,
        timing: Timing,
        generation: u64,
    ) -> Ticker {
        let (stop, stopped) = channel::bounded::<()>(0);
        let handle = thread::spawn(move || run(&name, &shared, &*sink, timing, generation, &stopped));
        Ticker {
            stop: Some(stop),
            handle: Some(handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the thread up.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub(super) fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn run(
    name: &str,
    shared: &Mutex<Shared>,
    sink: &dyn CommandSink,
    timing: Timing,
    generation: u64,
    stopped: &Receiver<()>,
) {
    debug!(light = name, generation, "ticker started");
    let epoch = Instant::now();
    let mut cursor = Cursor::new();
    let mut deadline = epoch;

    loop {
        match stopped.recv_deadline(deadline) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => break,
        }

        let tick = timing.tick_at(epoch.elapsed());
        {
            let mut state = lock(shared);
            // A newer on/off/transitions call owns the light now.
            if state.generation != generation {
                break;
            }

            let frames = Arc::clone(&state.frames);
            match cursor.advance(&frames, tick) {
                Step::Unchanged => {}
                Step::Color(frame) => {
                    state.effective_color = frame.effective_color();
                }
                Step::Write(frame) => {
                    state.effective_color = frame.effective_color();
                    trace!(light = name, tick, command = frame.command(), "frame");
                    // Sent under the lock so a concurrent off() can't be overtaken.
                    sink.execute(frame.command());
                }
            }
        }

        deadline = epoch + timing.tick_start(tick + 1);
    }
    debug!(light = name, generation, "ticker stopped");
}
