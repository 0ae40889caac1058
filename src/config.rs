use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Runtime configuration, loaded once at startup and immutable after that.
///
/// Every field has a default matching the reference deployment, so a missing
/// config file (or one that only overrides a couple of keys) is fine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Distance above which the opening counts as unsafe, in centimeters.
    pub distance_threshold_cm: f64,
    /// Minimum spacing between "alive" notifications, in seconds.
    pub heartbeat_interval_s: f64,
    /// Pause between polls while idle, in seconds.
    pub poll_interval_s: f64,
    /// Pause between re-reads while waiting for the distance to clear.
    pub sub_loop_wait_s: f64,
    /// BCM pin driving the ultrasonic sensor's trigger line.
    pub trigger_pin: u8,
    /// BCM pin reading the ultrasonic sensor's echo line.
    pub echo_pin: u8,
    /// BCM pin driving the buzzer.
    pub buzzer_pin: u8,
    /// Base URL of the notification service, no trailing slash.
    pub endpoint: String,
    pub user: String,
    pub pass: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            distance_threshold_cm: 10.0,
            heartbeat_interval_s: 30.0,
            poll_interval_s: 0.1,
            sub_loop_wait_s: 1.0,
            trigger_pin: 23,
            echo_pin: 24,
            buzzer_pin: 18,
            endpoint: String::from("http://localhost:3000"),
            user: String::from("user"),
            pass: String::from("pass"),
        }
    }
}

impl Config {
    /// Reads `path` as TOML. A missing file yields the defaults; a present
    /// but malformed file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs_f64(self.heartbeat_interval_s)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_s)
    }

    pub fn sub_loop_wait(&self) -> Duration {
        Duration::from_secs_f64(self.sub_loop_wait_s)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config file: {}", err),
            ConfigError::Parse(err) => write!(f, "invalid config file: {}", err),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
