use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::{fs, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixture::{Fixture, Pin};
use crate::host::piblaster::DEFAULT_DEVICE_PATH;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,
    /// PWM control channel and daemon.
    #[serde(default)]
    pub device: Device,
    /// Animation frame rate.
    #[serde(default = "default_frames_per_second")]
    pub frames_per_second: u32,
    /// Light name -> fixture wiring.
    pub lights: BTreeMap<String, Fixture>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Host address to serve the HTTP API on.
    pub web_addr: String,
}

impl Default for Server {
    fn default() -> Server {
        Server {
            web_addr: "0.0.0.0:80".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Path of the daemon's control FIFO.
    #[serde(default = "default_device_path")]
    pub path: String,
    /// Daemon to launch at startup, if any.
    #[serde(default = "default_daemon")]
    pub daemon: Option<Daemon>,
}

impl Default for Device {
    fn default() -> Device {
        Device {
            path: default_device_path(),
            daemon: default_daemon(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Daemon {
    pub bin: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Daemon {
    /// Parse a `bin arg arg` command line.
    pub fn from_command_line(line: &str) -> Option<Daemon> {
        let mut words = line.split_whitespace().map(str::to_owned);
        let bin = words.next()?;
        Some(Daemon {
            bin,
            args: words.collect(),
        })
    }
}

fn default_frames_per_second() -> u32 {
    30
}

fn default_device_path() -> String {
    DEFAULT_DEVICE_PATH.to_owned()
}

fn default_daemon() -> Option<Daemon> {
    Daemon::from_command_line("./pi-blaster --foreground")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no lights configured")]
    NoLights,
    #[error("frames per second must be between 1 and 1000, got {0}")]
    FramesPerSecond(u32),
    #[error("light {light} reuses pin {pin}, already taken by {owner}")]
    DuplicatePin { light: String, pin: Pin, owner: String },
    #[error("invalid API_PORT: {0:?}")]
    InvalidPort(String),
}

pub fn read_config_yaml<T: AsRef<Path>>(path: T) -> Result<Root, ConfigError> {
    let text = fs::read_to_string(path)?;
    let root: Root = serde_yaml::from_str(&text)?;
    root.check()?;
    Ok(root)
}

pub fn read_config_json<T: AsRef<Path>>(path: T) -> Result<Root, ConfigError> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let root: Root = serde_json::from_reader(reader)?;
    root.check()?;
    Ok(root)
}

/// Pick the reader by file extension; anything but `.json` is YAML.
pub fn read_config<T: AsRef<Path>>(path: T) -> Result<Root, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => read_config_json(path),
        _ => read_config_yaml(path),
    }
}

impl Root {
    /// Quick sanity check for the configuration.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.lights.is_empty() {
            return Err(ConfigError::NoLights);
        }
        if !(1..=1000).contains(&self.frames_per_second) {
            return Err(ConfigError::FramesPerSecond(self.frames_per_second));
        }

        // Two channels on one pin would fight over the duty cycle.
        let mut owners: HashMap<Pin, &str> = HashMap::new();
        for (name, fixture) in &self.lights {
            for pin in fixture.pins() {
                if let Some(owner) = owners.insert(pin, name) {
                    return Err(ConfigError::DuplicatePin {
                        light: name.clone(),
                        pin,
                        owner: owner.to_owned(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply `API_PORT`, `PI_BLASTER` and `PI_BLASTER_BIN` overrides.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("API_PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            let host = match self.server.web_addr.rsplit_once(':') {
                Some((host, _)) => host.to_owned(),
                None => self.server.web_addr.clone(),
            };
            self.server.web_addr = format!("{}:{}", host, port);
        }
        if let Some(path) = var("PI_BLASTER") {
            self.device.path = path;
        }
        if let Some(line) = var("PI_BLASTER_BIN") {
            self.device.daemon = Daemon::from_command_line(&line);
        }
        Ok(())
    }
}
