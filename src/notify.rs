use std::fmt;
use std::time::Duration;

use log::{debug, warn};

use crate::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Alive,
    Alert,
}

impl Kind {
    fn endpoint(self) -> &'static str {
        match self {
            Kind::Alive => "alive",
            Kind::Alert => "alert",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Fire-and-forget delivery of liveness and alert signals. Outcomes are
/// observed for logging only, never for control flow.
pub trait Notify {
    fn notify(&mut self, kind: Kind);
}

pub struct Notifier {
    agent: ureq::Agent,
    endpoint: String,
    user: String,
    pass: String,
}

impl Notifier {
    pub fn new(config: &Config) -> Self {
        // The timeout keeps a wedged network path from stalling the
        // monitoring loop for longer than one bounded request.
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build();
        Notifier {
            agent,
            endpoint: config.endpoint.clone(),
            user: config.user.clone(),
            pass: config.pass.clone(),
        }
    }

    fn url(&self, kind: Kind) -> String {
        format!(
            "{}/{}?user={}&pass={}",
            self.endpoint,
            kind.endpoint(),
            self.user,
            self.pass
        )
    }
}

impl Notify for Notifier {
    fn notify(&mut self, kind: Kind) {
        match self.agent.get(&self.url(kind)).call() {
            Ok(response) => debug!("{} notification delivered ({})", kind, response.status()),
            Err(ureq::Error::Status(code, _)) => {
                warn!("{} notification rejected with status {}", kind, code)
            }
            Err(err) => warn!("unable to send {} notification: {}", kind, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_endpoint_kind_and_credentials() {
        let notifier = Notifier::new(&Config::default());
        assert_eq!(
            notifier.url(Kind::Alive),
            "http://localhost:3000/alive?user=user&pass=pass"
        );
        assert_eq!(
            notifier.url(Kind::Alert),
            "http://localhost:3000/alert?user=user&pass=pass"
        );
    }

    #[test]
    fn url_respects_configured_endpoint() {
        let config = Config {
            endpoint: String::from("http://192.168.1.5:3000"),
            user: String::from("garage"),
            pass: String::from("s3cret"),
            ..Config::default()
        };
        let notifier = Notifier::new(&config);
        assert_eq!(
            notifier.url(Kind::Alert),
            "http://192.168.1.5:3000/alert?user=garage&pass=s3cret"
        );
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        // Port 9 (discard) refuses the connection; the failure must surface
        // only in the log, never to the caller.
        let config = Config {
            endpoint: String::from("http://127.0.0.1:9"),
            ..Config::default()
        };
        let mut notifier = Notifier::new(&config);
        notifier.notify(Kind::Alive);
        notifier.notify(Kind::Alert);
    }

    #[test]
    fn kind_displays_as_its_endpoint() {
        assert_eq!(Kind::Alive.to_string(), "alive");
        assert_eq!(Kind::Alert.to_string(), "alert");
    }
}
