use std::error::Error as _;

use thiserror::Error;

/// Failure to complete a check, as opposed to a check that completed and failed
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CheckError {
    /// No response headers arrived in time
    #[error("timeout exceeded while awaiting headers ({seconds}s)")]
    Timeout {
        /// Configured timeout in seconds
        seconds: u64,
    },
    /// DNS resolution, TCP connect or TLS handshake did not finish in time
    #[error("timeout exceeded while connecting ({seconds}s)")]
    ConnectTimeout {
        /// Configured timeout in seconds
        seconds: u64,
    },
    /// Headers arrived but the body did not complete in time
    #[error("timeout exceeded while reading body ({seconds}s)")]
    BodyTimeout {
        /// Configured timeout in seconds
        seconds: u64,
    },
    /// DNS resolution, TCP connect or TLS handshake failed
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other transport failure
    #[error("request failed: {0}")]
    Request(String),
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    /// Scheme, host, port and URI do not form a valid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl CheckError {
    /// Classify an error raised before the response headers arrived
    pub(crate) fn sending(e: &reqwest::Error, seconds: u64) -> Self {
        Self::classify(e.is_timeout(), e.is_connect(), seconds, || describe(e))
    }

    fn classify<F>(timeout: bool, connect: bool, seconds: u64, describe: F) -> Self
    where
        F: FnOnce() -> String,
    {
        match (timeout, connect) {
            (true, true) => CheckError::ConnectTimeout { seconds },
            (true, false) => CheckError::Timeout { seconds },
            (false, true) => CheckError::Connect(describe()),
            (false, false) => CheckError::Request(describe()),
        }
    }

    /// Classify an error raised while the body was being read
    pub(crate) fn reading(e: &reqwest::Error, seconds: u64) -> Self {
        if e.is_timeout() {
            CheckError::BodyTimeout { seconds }
        } else {
            CheckError::Request(describe(e))
        }
    }
}

// reqwest hides the root cause (refused, DNS, certificate) in the source chain
fn describe(e: &reqwest::Error) -> String {
    let mut s = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        s.push_str(": ");
        s.push_str(&cause.to_string());
        source = cause.source();
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn t_display() {
        let e = CheckError::Timeout { seconds: 5 };
        assert_eq!("timeout exceeded while awaiting headers (5s)", e.to_string());

        let e = CheckError::BodyTimeout { seconds: 5 };
        assert_eq!("timeout exceeded while reading body (5s)", e.to_string());

        let e = CheckError::Connect("connection refused".to_string());
        assert_eq!("connection failed: connection refused", e.to_string());

        let e = CheckError::ConnectTimeout { seconds: 5 };
        assert_eq!("timeout exceeded while connecting (5s)", e.to_string());
    }

    #[test]
    fn t_classify() {
        let describe = || "cause".to_string();
        assert_eq!(
            CheckError::ConnectTimeout { seconds: 5 },
            CheckError::classify(true, true, 5, describe)
        );
        assert_eq!(
            CheckError::Timeout { seconds: 5 },
            CheckError::classify(true, false, 5, describe)
        );
        assert_eq!(
            CheckError::Connect("cause".to_string()),
            CheckError::classify(false, true, 5, describe)
        );
        assert_eq!(
            CheckError::Request("cause".to_string()),
            CheckError::classify(false, false, 5, describe)
        );
    }
}
