use std::fmt;

use chrono::{TimeZone, Utc};
use num_format::{Locale, ToFormattedString};

use crate::error::CheckError;

/// Monitoring plugin state, doubles as process exit code
///
/// Ordered by severity, `Ok < Warning < Critical`. `Unknown` sorts last.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ExitState {
    /// Every applicable rule passed
    Ok = 0,
    /// Certificate is about to expire
    Warning = 1,
    /// Transport failure or a rule failed
    Critical = 2,
    /// Check is misconfigured (default)
    #[default]
    Unknown = 3,
}

impl ExitState {
    /// Process exit code
    ///
    /// ```
    /// # use hhc::ExitState;
    /// assert_eq!(0, ExitState::Ok.code());
    /// assert_eq!(3, ExitState::Unknown.code());
    /// ```
    pub fn code(self) -> i32 {
        match self {
            ExitState::Ok => 0,
            ExitState::Warning => 1,
            ExitState::Critical => 2,
            ExitState::Unknown => 3,
        }
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Ok => write!(f, "OK"),
            ExitState::Warning => write!(f, "WARNING"),
            ExitState::Critical => write!(f, "CRITICAL"),
            ExitState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Expiry of the leaf certificate
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Expiry {
    /// Remaining whole days, floored
    pub days: i64,
    /// Exact expiration time in seconds since Unix epoch
    pub not_after: i64,
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.days.to_formatted_string(&Locale::en);
        match Utc.timestamp_opt(self.not_after, 0).single() {
            Some(t) => write!(f, "certificate expires in {days} days ({})", t.to_rfc3339()),
            None => write!(f, "certificate expires in {days} days"),
        }
    }
}

/// What the check found out
#[derive(Debug)]
pub enum Outcome {
    /// Every applicable rule passed
    Passed {
        /// Status code of the response
        status: u16,
        /// Certificate expiry, when it was inspected
        expiry: Option<Expiry>,
    },
    /// Status code is not one of the expected ones
    UnexpectedStatus {
        /// Status code of the response
        status: u16,
        /// Expected status codes
        expected: Vec<u16>,
    },
    /// Body does not contain the expected text
    MissingBodyText(String),
    /// Certificate expires within a threshold
    CertificateExpiring {
        /// Certificate expiry
        expiry: Expiry,
        /// Threshold in days that tripped
        threshold: i64,
    },
    /// Leaf certificate is absent or cannot be parsed
    CertificateUnreadable(String),
    /// Request could not be completed
    Transport(CheckError),
    /// Check cannot run with the given parameters
    Misconfigured(String),
}

/// Check result
#[derive(Debug)]
pub struct Checked {
    /// Plugin state
    pub state: ExitState,
    /// Finding behind the state
    pub outcome: Outcome,
    /// When the check ran in seconds since Unix epoch
    pub checked_at: i64,
    /// Elapsed time in milliseconds, verbose only
    pub elapsed: Option<u128>,
    /// Body size in bytes, verbose only
    pub size: Option<usize>,
}

impl Checked {
    /// Result with the given state and outcome
    pub fn new(state: ExitState, outcome: Outcome, checked_at: i64) -> Self {
        Checked {
            state,
            outcome,
            checked_at,
            elapsed: None,
            size: None,
        }
    }

    /// Check cannot run with the given parameters
    ///
    /// ```
    /// # use hhc::{Checked, ExitState};
    /// let checked = Checked::misconfigured("no expected status codes", 0);
    /// assert_eq!(ExitState::Unknown, checked.state);
    /// assert_eq!("UNKNOWN - no expected status codes", checked.to_string());
    /// ```
    pub fn misconfigured<T>(reason: T, checked_at: i64) -> Self
    where
        T: Into<String>,
    {
        Checked::new(
            ExitState::Unknown,
            Outcome::Misconfigured(reason.into()),
            checked_at,
        )
    }

    /// Request could not be completed
    pub fn transport(e: CheckError, checked_at: i64) -> Self {
        Checked::new(ExitState::Critical, Outcome::Transport(e), checked_at)
    }

    /// Transport error, if any
    pub fn error(&self) -> Option<&CheckError> {
        match self.outcome {
            Outcome::Transport(ref e) => Some(e),
            _ => None,
        }
    }

    /// Human-readable sentence of the outcome
    ///
    /// ```
    /// # use hhc::{Checked, ExitState, Outcome};
    /// let checked = Checked::new(
    ///     ExitState::Critical,
    ///     Outcome::MissingBodyText("foobar".to_string()),
    ///     0,
    /// );
    /// assert_eq!("response body does not contain \"foobar\"", checked.sentence());
    /// ```
    pub fn sentence(&self) -> String {
        match self.outcome {
            Outcome::Passed { status, expiry } => match expiry {
                Some(expiry) => format!("HTTP {status}, {expiry}"),
                None => format!("HTTP {status}"),
            },
            Outcome::UnexpectedStatus {
                status,
                ref expected,
            } => {
                let expected = expected
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("HTTP {status} is not one of expected status codes [{expected}]")
            }
            Outcome::MissingBodyText(ref text) => {
                format!("response body does not contain {text:?}")
            }
            Outcome::CertificateExpiring { expiry, threshold } => {
                format!("{expiry}, less than {threshold} days")
            }
            Outcome::CertificateUnreadable(ref e) => format!("failed to read certificate: {e}"),
            Outcome::Transport(ref e) => e.to_string(),
            Outcome::Misconfigured(ref reason) => reason.clone(),
        }
    }

    /// Split into message, state and transport error
    ///
    /// ```
    /// # use hhc::{CheckError, Checked, ExitState};
    /// let checked = Checked::transport(CheckError::Timeout { seconds: 5 }, 0);
    /// let (message, state, error) = checked.into_parts();
    /// assert_eq!("CRITICAL - timeout exceeded while awaiting headers (5s)", message);
    /// assert_eq!(ExitState::Critical, state);
    /// assert_eq!(Some(CheckError::Timeout { seconds: 5 }), error);
    /// ```
    pub fn into_parts(self) -> (String, ExitState, Option<CheckError>) {
        let message = self.to_string();
        let error = match self.outcome {
            Outcome::Transport(e) => Some(e),
            _ => None,
        };
        (message, self.state, error)
    }
}

impl fmt::Display for Checked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(100);

        s.push_str(&self.state.to_string());

        s.push_str(" - ");

        s.push_str(&self.sentence());

        if let Some(size) = self.size {
            let size = size.to_formatted_string(&Locale::en);
            s.push_str(&format!(", {size} bytes"));
        }

        if let Some(elapsed) = self.elapsed {
            s.push_str(&format!(", {elapsed}ms elapsed"));
        }

        write!(f, "{s}")
    }
}
