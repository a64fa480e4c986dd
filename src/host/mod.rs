//! Hosts receive duty cycle commands and produce physical effects.

use std::sync::Mutex;

pub mod daemon;
pub mod piblaster;

pub use self::daemon::Daemon;
pub use self::piblaster::PiBlaster;

/// Accepts `pin=value` commands for the PWM hardware.
///
/// Implementations must not block the caller for long and must not fail
/// loudly: a lost command is corrected by the next one that changes.
pub trait CommandSink: Send + Sync {
    fn execute(&self, command: &str);
}

/// Keeps every command in memory instead of writing it anywhere.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    /// Commands received so far, oldest first.
    pub fn commands(&self) -> Vec<String> {
        match self.commands.lock() {
            Ok(commands) => commands.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.commands().pop()
    }
}

impl CommandSink for RecordingSink {
    fn execute(&self, command: &str) {
        match self.commands.lock() {
            Ok(mut commands) => commands.push(command.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(command.to_owned()),
        }
    }
}
