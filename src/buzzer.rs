use std::thread;
use std::time::Duration;

use log::warn;
use rppal::gpio::{Gpio, OutputPin};

const DUTY_CYCLE: f64 = 0.5;

const C5: f64 = 523.0;
const E5: f64 = 659.0;
const G5: f64 = 784.0;

/// One tone in a pattern: play `frequency` for `duration`, then stay quiet
/// for `gap` before the next note.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Note {
    pub frequency: f64,
    pub duration: Duration,
    pub gap: Duration,
}

/// Ascending triad played once after the startup heartbeat. The exact
/// frequencies and timings are load-bearing: users recognize the jingle.
pub const SUCCESS_TONE: [Note; 3] = [
    Note {
        frequency: C5,
        duration: Duration::from_millis(200),
        gap: Duration::from_millis(250),
    },
    Note {
        frequency: E5,
        duration: Duration::from_millis(200),
        gap: Duration::from_millis(250),
    },
    Note {
        frequency: G5,
        duration: Duration::from_millis(300),
        gap: Duration::from_millis(300),
    },
];

/// Descending triad played once per alert.
pub const FAILURE_TONE: [Note; 3] = [
    Note {
        frequency: G5,
        duration: Duration::from_millis(150),
        gap: Duration::from_millis(50),
    },
    Note {
        frequency: E5,
        duration: Duration::from_millis(150),
        gap: Duration::from_millis(50),
    },
    Note {
        frequency: C5,
        duration: Duration::from_millis(300),
        gap: Duration::from_millis(100),
    },
];

/// Audible feedback. Implementations must never fail loudly; a broken
/// buzzer degrades to silence, not to a stopped monitor.
pub trait Sounder {
    fn success_tone(&mut self);
    fn failure_tone(&mut self);
    fn silence(&mut self);
}

/// Piezo buzzer driven with software PWM on a single output pin.
pub struct Buzzer {
    pin: OutputPin,
}

impl Buzzer {
    pub fn new(gpio: &Gpio, pin: u8) -> rppal::gpio::Result<Self> {
        Ok(Buzzer {
            pin: gpio.get(pin)?.into_output(),
        })
    }

    /// Blocks for `duration`, sounding at `frequency` with a 50% duty cycle,
    /// then goes quiet.
    pub fn tone(&mut self, frequency: f64, duration: Duration) -> rppal::gpio::Result<()> {
        self.pin.set_pwm_frequency(frequency, DUTY_CYCLE)?;
        thread::sleep(duration);
        self.pin.clear_pwm()
    }

    fn play(&mut self, pattern: &[Note]) -> rppal::gpio::Result<()> {
        for note in pattern {
            self.tone(note.frequency, note.duration)?;
            thread::sleep(note.gap);
        }
        Ok(())
    }
}

impl Sounder for Buzzer {
    fn success_tone(&mut self) {
        if let Err(err) = self.play(&SUCCESS_TONE) {
            warn!("unable to play success tone: {}", err);
        }
    }

    fn failure_tone(&mut self) {
        if let Err(err) = self.play(&FAILURE_TONE) {
            warn!("unable to play failure tone: {}", err);
        }
    }

    fn silence(&mut self) {
        if let Err(err) = self.pin.clear_pwm() {
            warn!("unable to silence buzzer: {}", err);
        }
    }
}

// A monitor without a buzzer still monitors. Pin acquisition failures leave
// us with `None` and every tone becomes a no-op.
impl Sounder for Option<Buzzer> {
    fn success_tone(&mut self) {
        if let Some(buzzer) = self {
            buzzer.success_tone();
        }
    }

    fn failure_tone(&mut self) {
        if let Some(buzzer) = self {
            buzzer.failure_tone();
        }
    }

    fn silence(&mut self) {
        if let Some(buzzer) = self {
            buzzer.silence();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_tone_is_the_ascending_triad() {
        let expected = [
            (523.0, 200, 250),
            (659.0, 200, 250),
            (784.0, 300, 300),
        ];
        for (note, (freq, dur, gap)) in SUCCESS_TONE.iter().zip(expected.iter()) {
            assert_eq!(note.frequency, *freq);
            assert_eq!(note.duration, Duration::from_millis(*dur));
            assert_eq!(note.gap, Duration::from_millis(*gap));
        }
    }

    #[test]
    fn failure_tone_is_the_descending_triad() {
        let expected = [
            (784.0, 150, 50),
            (659.0, 150, 50),
            (523.0, 300, 100),
        ];
        for (note, (freq, dur, gap)) in FAILURE_TONE.iter().zip(expected.iter()) {
            assert_eq!(note.frequency, *freq);
            assert_eq!(note.duration, Duration::from_millis(*dur));
            assert_eq!(note.gap, Duration::from_millis(*gap));
        }
    }

    #[test]
    fn missing_buzzer_swallows_every_tone() {
        let mut sounder: Option<Buzzer> = None;
        sounder.success_tone();
        sounder.failure_tone();
        sounder.silence();
    }
}
