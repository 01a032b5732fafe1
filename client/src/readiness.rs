//! Poll a health endpoint until it answers with a 2xx.

use std::thread;

use tracing::{debug, info};

use crate::config::ReadinessPolicy;
use crate::error::ClientError;

/// GET `url` until it returns 2xx, at most `policy.max_attempts` times with
/// `policy.interval` between attempts. `on_retry(attempt, max_attempts)` is
/// called after every failed attempt.
///
/// Returns the 1-based attempt that succeeded.
pub fn wait_until_ready(
    agent: &ureq::Agent,
    url: &str,
    policy: &ReadinessPolicy,
    mut on_retry: impl FnMut(u32, u32),
) -> Result<u32, ClientError> {
    for attempt in 1..=policy.max_attempts {
        match agent.get(url).call() {
            Ok(response) if response.status().is_success() => {
                info!(url, attempt, "endpoint is ready");
                return Ok(attempt);
            }
            Ok(response) => {
                debug!(url, attempt, status = response.status().as_u16(), "not ready yet");
            }
            Err(e) => {
                debug!(url, attempt, error = %e, "not ready yet");
            }
        }

        on_retry(attempt, policy.max_attempts);
        if attempt < policy.max_attempts {
            thread::sleep(policy.interval);
        }
    }

    Err(ClientError::NotReady {
        url: url.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ClientConfig;

    fn closed_url() -> String {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        format!("http://{addr}/_localstack/health")
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let agent = ClientConfig::new("http://unused").agent();
        let policy = ReadinessPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(10),
        };
        let url = closed_url();
        let mut retries = Vec::new();

        let err = wait_until_ready(&agent, &url, &policy, |attempt, max| {
            retries.push((attempt, max))
        })
        .unwrap_err();

        assert!(matches!(err, ClientError::NotReady { attempts: 3, .. }));
        assert_eq!(retries, vec![(1, 3), (2, 3), (3, 3)]);
        assert!(err.to_string().contains(&url));
    }

    /// Answer exactly one request with `status_line`, then close.
    fn one_shot_server(status_line: &'static str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0_u8; 1024];
            let _ = stream.read(&mut buf);
            let response =
                format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/_localstack/health")
    }

    #[test]
    fn returns_first_successful_attempt() {
        let agent = ClientConfig::new("http://unused").agent();
        let policy = ReadinessPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(10),
        };
        let attempt = wait_until_ready(&agent, &one_shot_server("200 OK"), &policy, |_, _| {
            panic!("no retry expected")
        })
        .unwrap();
        assert_eq!(attempt, 1);
    }

    #[test]
    fn non_success_status_is_not_ready() {
        let agent = ClientConfig::new("http://unused").agent();
        let policy = ReadinessPolicy {
            max_attempts: 1,
            interval: Duration::from_millis(10),
        };
        let err = wait_until_ready(
            &agent,
            &one_shot_server("503 Service Unavailable"),
            &policy,
            |_, _| {},
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::NotReady { attempts: 1, .. }));
    }

    #[test]
    fn zero_attempts_fails_immediately() {
        let agent = ClientConfig::new("http://unused").agent();
        let policy = ReadinessPolicy {
            max_attempts: 0,
            interval: Duration::from_secs(60),
        };
        let err = wait_until_ready(&agent, &closed_url(), &policy, |_, _| {}).unwrap_err();
        assert!(matches!(err, ClientError::NotReady { attempts: 0, .. }));
    }
}
