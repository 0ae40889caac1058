use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::{env, process};

use rppal::gpio::Gpio;
use syslog::Facility;

use door_alarm::buzzer::Buzzer;
use door_alarm::notify::Notifier;
use door_alarm::sensor::UltrasonicSensor;
use door_alarm::{Config, Monitor};

const DEFAULT_CONFIG_PATH: &str = "/etc/door-alarm.toml";

fn main() -> Result<(), Box<dyn Error>> {
    if let Err(err) = syslog::init(Facility::LOG_USER, log::LevelFilter::Debug, Some("door-alarm"))
    {
        eprintln!("syslog unavailable, continuing without it: {}", err);
    }

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)?;

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;

    // Without a sensor there is nothing to monitor; a missing buzzer only
    // costs us the audio.
    let gpio = Gpio::new().unwrap_or_else(|err| {
        eprintln!("unable to access GPIO: {}", err);
        process::exit(1);
    });
    let sensor =
        UltrasonicSensor::new(&gpio, config.trigger_pin, config.echo_pin).unwrap_or_else(|err| {
            eprintln!("unable to set up distance sensor: {}", err);
            process::exit(1);
        });
    let buzzer = match Buzzer::new(&gpio, config.buzzer_pin) {
        Ok(buzzer) => Some(buzzer),
        Err(err) => {
            eprintln!("unable to set up buzzer, running without audio: {}", err);
            None
        }
    };
    let notifier = Notifier::new(&config);

    let mut monitor = Monitor::new(&config, sensor, buzzer, notifier);
    monitor.run(&term);

    Ok(())
}
