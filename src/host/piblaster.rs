//! pi-blaster control channel writer.
//!
//! Commands are queued to a writer thread which opens the device node, appends
//! one line and closes it again. Failures are logged and the command is dropped.
//! The node is opened non-blocking: a FIFO nobody reads from fails right away
//! instead of stalling the writer.

use std::fs::OpenOptions;
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender, TrySendError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::CommandSink;

/// Default pi-blaster FIFO.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/pi-blaster";

/// Commands waiting for the writer thread. Anything beyond is dropped.
pub const QUEUE_CAPACITY: usize = 256;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to write to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Append a single command line to the device. No handle outlives the call.
pub fn write_command(path: &Path, command: &str) -> Result<(), DeviceError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    // ENXIO when a FIFO has no reader.
    #[cfg(unix)]
    options.custom_flags(libc::O_NONBLOCK);

    let mut file = options
        .open(path)
        .map_err(|source| DeviceError::Open {
            path: path.to_owned(),
            source,
        })?;

    let line = format!("{}\n", command);
    file.write_all(line.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| DeviceError::Write {
            path: path.to_owned(),
            source,
        })
}

/// Fire-and-forget writer for the pi-blaster control channel.
pub struct PiBlaster {
    sender: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl PiBlaster {
    pub fn new<P: Into<PathBuf>>(path: P) -> PiBlaster {
        let path = path.into();
        let (sender, receiver) = channel::bounded::<String>(QUEUE_CAPACITY);

        info!(device = %path.display(), "starting device writer");
        let worker = thread::spawn(move || {
            for command in receiver {
                match write_command(&path, &command) {
                    Ok(()) => debug!(%command, "wrote command"),
                    Err(err) => error!(%command, "{}", err),
                }
            }
        });

        PiBlaster {
            sender: Some(sender),
            worker: Some(worker),
        }
    }
}

impl CommandSink for PiBlaster {
    fn execute(&self, command: &str) {
        if let Some(sender) = &self.sender {
            match sender.try_send(command.to_owned()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(%command, "device writer is behind, dropping command")
                }
                Err(TrySendError::Disconnected(_)) => {
                    error!(%command, "device writer is gone, dropping command")
                }
            }
        }
    }
}

impl Drop for PiBlaster {
    /// Drain queued commands before going away.
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("device writer thread panicked");
            }
        }
    }
}
