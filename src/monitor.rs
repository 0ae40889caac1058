use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::buzzer::Sounder;
use crate::notify::{Kind, Notify};
use crate::sensor::ReadDistance;
use crate::Config;

/// The two states of the monitoring loop.
///
/// `Alerting` means an excursion above the threshold was detected and its
/// side effects have already fired; the loop is re-polling until the
/// distance clears. Waiting is a state, not a nested loop, so the debounce
/// behavior is testable one step at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlertState {
    Idle,
    Alerting,
}

/// Tracks when the last "alive" notification went out.
struct HeartbeatClock {
    last: Instant,
    interval: Duration,
}

impl HeartbeatClock {
    fn new(interval: Duration) -> Self {
        HeartbeatClock {
            last: Instant::now(),
            interval,
        }
    }

    fn due(&self) -> bool {
        self.last.elapsed() > self.interval
    }

    fn mark(&mut self) {
        self.last = Instant::now();
    }
}

/// The monitoring loop's context: sensor, buzzer and notifier behind their
/// seams, plus all mutable loop state. No globals.
pub struct Monitor<R, S, N> {
    sensor: R,
    sounder: S,
    notifier: N,
    state: AlertState,
    heartbeat: HeartbeatClock,
    threshold_cm: f64,
    poll_interval: Duration,
    sub_loop_wait: Duration,
}

impl<R, S, N> Monitor<R, S, N>
where
    R: ReadDistance,
    S: Sounder,
    N: Notify,
{
    pub fn new(config: &Config, sensor: R, sounder: S, notifier: N) -> Self {
        Monitor {
            sensor,
            sounder,
            notifier,
            state: AlertState::Idle,
            heartbeat: HeartbeatClock::new(config.heartbeat_interval()),
            threshold_cm: config.distance_threshold_cm,
            poll_interval: config.poll_interval(),
            sub_loop_wait: config.sub_loop_wait(),
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Startup sequence: one unconditional "alive", the startup jingle, and
    /// the heartbeat clock starts counting from here.
    pub fn start(&mut self) {
        self.notifier.notify(Kind::Alive);
        self.sounder.success_tone();
        self.heartbeat.mark();
    }

    /// Runs until `term` is set, then silences the buzzer. Termination is
    /// only observed at poll boundaries; an in-flight tone or request is
    /// allowed to finish.
    pub fn run(&mut self, term: &AtomicBool) {
        self.start();
        while !term.load(Ordering::Relaxed) {
            let pause = self.step();
            thread::sleep(pause);
        }
        self.sounder.silence();
        info!("monitor loop exiting");
    }

    /// One iteration. Returns how long to pause before the next one.
    pub fn step(&mut self) -> Duration {
        // The heartbeat clock is only serviced while idle; a long excursion
        // suspends heartbeats until the distance drops again.
        if self.state == AlertState::Idle && self.heartbeat.due() {
            self.notifier.notify(Kind::Alive);
            self.heartbeat.mark();
        }

        let distance = match self.sensor.distance_cm() {
            Ok(distance) => distance,
            Err(err) => {
                // No new data; keep the previous state and poll again.
                warn!("sensor read failed, skipping poll: {}", err);
                return self.pause();
            }
        };
        debug!("distance: {:.2} cm", distance);

        match self.state {
            AlertState::Idle if distance > self.threshold_cm => {
                self.state = AlertState::Alerting;
                info!(
                    "alert: distance {:.2} cm exceeds threshold {:.2} cm",
                    distance, self.threshold_cm
                );
                self.sounder.failure_tone();
                self.notifier.notify(Kind::Alert);
            }
            AlertState::Alerting if distance <= self.threshold_cm => {
                // Clearing is silent: no tone, no notification.
                self.state = AlertState::Idle;
                info!("distance back under threshold");
            }
            AlertState::Alerting => {
                info!("waiting for distance to clear");
            }
            AlertState::Idle => {}
        }
        self.pause()
    }

    fn pause(&self) -> Duration {
        match self.state {
            AlertState::Idle => self.poll_interval,
            AlertState::Alerting => self.sub_loop_wait,
        }
    }
}
