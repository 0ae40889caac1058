pub mod buzzer;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod sensor;

pub use config::Config;
pub use monitor::{AlertState, Monitor};
