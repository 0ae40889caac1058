use std::error::Error;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin, Level, OutputPin};

/// Speed of sound at room temperature.
const SPEED_OF_SOUND_CM_PER_S: f64 = 34_300.0;
const TRIGGER_PULSE: Duration = Duration::from_micros(10);
// The HC-SR04 gives up after ~38ms with no echo; allow a bit more before we
// declare the reading lost.
const ECHO_DEADLINE: Duration = Duration::from_millis(60);

/// One fresh distance measurement per call.
pub trait ReadDistance {
    fn distance_cm(&mut self) -> Result<f64, SensorError>;
}

/// HC-SR04 ultrasonic ranger on a trigger/echo pin pair.
pub struct UltrasonicSensor {
    trigger: OutputPin,
    echo: InputPin,
}

impl UltrasonicSensor {
    pub fn new(gpio: &Gpio, trigger_pin: u8, echo_pin: u8) -> Result<Self, SensorError> {
        let mut trigger = gpio.get(trigger_pin)?.into_output();
        trigger.set_low();
        let echo = gpio.get(echo_pin)?.into_input_pulldown();
        Ok(UltrasonicSensor { trigger, echo })
    }

    fn pulse_width(&mut self) -> Result<Duration, SensorError> {
        self.trigger.set_high();
        thread::sleep(TRIGGER_PULSE);
        self.trigger.set_low();

        let deadline = Instant::now() + ECHO_DEADLINE;
        while self.echo.read() == Level::Low {
            if Instant::now() > deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        let pulse_start = Instant::now();
        while self.echo.read() == Level::High {
            if Instant::now() > deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        Ok(pulse_start.elapsed())
    }
}

impl ReadDistance for UltrasonicSensor {
    fn distance_cm(&mut self) -> Result<f64, SensorError> {
        self.pulse_width().map(pulse_to_cm)
    }
}

/// The echo pulse lasts as long as the sound's round trip, so halve it.
fn pulse_to_cm(width: Duration) -> f64 {
    width.as_secs_f64() * SPEED_OF_SOUND_CM_PER_S / 2.0
}

#[derive(Debug)]
pub enum SensorError {
    Gpio(rppal::gpio::Error),
    EchoTimeout,
}

impl From<rppal::gpio::Error> for SensorError {
    fn from(err: rppal::gpio::Error) -> Self {
        SensorError::Gpio(err)
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Gpio(err) => write!(f, "gpio error: {}", err),
            SensorError::EchoTimeout => f.write_str("no echo pulse within deadline"),
        }
    }
}

impl Error for SensorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SensorError::Gpio(err) => Some(err),
            SensorError::EchoTimeout => None,
        }
    }
}
