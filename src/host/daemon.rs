//! Launches the PWM daemon that owns the control channel.

use std::io;
use std::process::{Child, Command, Stdio};

use tracing::{error, info, warn};

/// Handle to a spawned daemon process. The process is killed on drop.
pub struct Daemon {
    child: Child,
}

impl Daemon {
    /// Start `bin` with `args`. Output is discarded.
    pub fn spawn(bin: &str, args: &[String]) -> io::Result<Daemon> {
        info!(%bin, ?args, "starting PWM daemon");
        let child = Command::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(Daemon { child })
    }

    /// Like [`Daemon::spawn`], but a failure is only logged.
    ///
    /// The server keeps running without a daemon; device writes will then fail
    /// and be logged one by one.
    pub fn spawn_or_warn(bin: &str, args: &[String]) -> Option<Daemon> {
        match Daemon::spawn(bin, args) {
            Ok(daemon) => Some(daemon),
            Err(err) => {
                warn!(%bin, "unable to start PWM daemon: {}", err);
                None
            }
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        info!(pid = self.child.id(), "stopping PWM daemon");
        if let Err(err) = self.child.kill() {
            error!("failed to stop PWM daemon: {}", err);
        }
        let _ = self.child.wait();
    }
}
