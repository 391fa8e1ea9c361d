use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::error::CheckError;

/// URL scheme of the endpoint
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    Http,
    /// HTTP over TLS (default)
    #[default]
    Https,
}

impl Scheme {
    /// Well-known port of the scheme
    ///
    /// ```
    /// # use hhc::Scheme;
    /// assert_eq!(80, Scheme::Http.default_port());
    /// assert_eq!(443, Scheme::Https.default_port());
    /// ```
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// Credentials attached to the outgoing request
#[derive(Clone, Default, Eq, PartialEq)]
pub enum Authentication {
    /// No credentials (default)
    #[default]
    None,
    /// HTTP Basic Authentication
    Basic {
        /// User name
        user: String,
        /// Password
        password: String,
    },
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authentication::None => write!(f, "None"),
            Authentication::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"********")
                .finish(),
        }
    }
}

/// Target of the check and how to reach it
#[derive(Clone, Debug)]
pub struct Request {
    /// URL scheme
    pub scheme: Scheme,
    /// Host name
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Path and query string
    pub uri: String,
    /// Upper bound of the whole round trip in seconds
    pub timeout_in_secs: u64,
    /// Include elapsed time and response size in the message?
    pub verbose: bool,
    /// Credentials
    pub authentication: Authentication,
}

impl Default for Request {
    fn default() -> Self {
        Request {
            scheme: Scheme::Https,
            host: String::new(),
            port: Scheme::Https.default_port(),
            uri: "/".to_string(),
            timeout_in_secs: 30,
            verbose: false,
            authentication: Authentication::None,
        }
    }
}

impl Request {
    /// Compose `scheme://host:port/uri`
    ///
    /// ```
    /// # use hhc::Request;
    /// let request = Request {
    ///     host: "httpbin.org".to_string(),
    ///     port: 8443,
    ///     uri: "status/200".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!("https://httpbin.org:8443/status/200", request.url().unwrap().as_str());
    /// ```
    pub fn url(&self) -> Result<Url, CheckError> {
        if self.host.is_empty() {
            return Err(CheckError::InvalidUrl("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(CheckError::InvalidUrl(format!(
                "port of {} must be between 1 and 65535",
                self.host
            )));
        }

        let uri: Cow<'_, str> = if self.uri.starts_with('/') {
            self.uri.as_str().into()
        } else {
            format!("/{}", self.uri).into()
        };
        let url = format!("{}://{}:{}{uri}", self.scheme, self.host, self.port);
        Url::parse(&url).map_err(|e| CheckError::InvalidUrl(format!("{url}: {e}")))
    }

    /// Timeout as [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_in_secs)
    }
}

/// Certificate expiry policy
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SslCheck {
    /// WARNING when fewer days than this remain
    pub days_warning: i64,
    /// CRITICAL when fewer days than this remain
    pub days_critical: i64,
}

impl Default for SslCheck {
    fn default() -> Self {
        SslCheck {
            days_warning: 30,
            days_critical: 14,
        }
    }
}

/// Pass/fail criteria of the response
#[derive(Clone, Debug, Default)]
pub struct Expected {
    /// Acceptable status codes, must not be empty
    pub status_codes: Vec<u16>,
    /// Substring the body must contain
    pub body_text: Option<String>,
    /// Inspect the leaf certificate of HTTPS endpoints?
    pub ssl_check: Option<SslCheck>,
}

impl Expected {
    /// Is the status code one of the expected ones?
    ///
    /// ```
    /// # use hhc::Expected;
    /// let expected = Expected {
    ///     status_codes: vec![200, 302],
    ///     ..Default::default()
    /// };
    /// assert!(expected.accepts(302));
    /// assert!(!expected.accepts(404));
    /// ```
    pub fn accepts(&self, status: u16) -> bool {
        self.status_codes.contains(&status)
    }

    /// Body text to look for, empty text means no body check
    pub fn body_text(&self) -> Option<&str> {
        self.body_text.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::str::FromStr;

    fn build_request() -> Request {
        Request {
            host: "example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn t_scheme() -> Result<(), strum::ParseError> {
        assert_eq!("http", Scheme::Http.to_string());
        assert_eq!("https", Scheme::Https.to_string());
        assert_eq!(Scheme::Http, Scheme::from_str("http")?);
        assert_eq!(Scheme::Https, Scheme::from_str("https")?);
        assert!(Scheme::from_str("ftp").is_err());
        Ok(())
    }

    #[test]
    fn t_url() -> Result<(), CheckError> {
        let mut request = build_request();
        request.uri = "/anything?foobar=baz".to_string();
        assert_eq!(
            "https://example.com/anything?foobar=baz",
            request.url()?.as_str()
        );

        request.scheme = Scheme::Http;
        request.port = 8080;
        request.uri = "status/200".to_string();
        assert_eq!("http://example.com:8080/status/200", request.url()?.as_str());
        Ok(())
    }

    #[test]
    fn t_url_invalid() {
        let mut request = build_request();
        request.port = 0;
        assert!(matches!(request.url(), Err(CheckError::InvalidUrl(_))));

        let request = Request::default();
        assert!(matches!(request.url(), Err(CheckError::InvalidUrl(_))));

        let mut request = build_request();
        request.host = "exa mple.com".to_string();
        assert!(matches!(request.url(), Err(CheckError::InvalidUrl(_))));
    }

    #[test]
    fn t_authentication_debug() {
        let authentication = Authentication::Basic {
            user: "user".to_string(),
            password: "password".to_string(),
        };
        let s = format!("{authentication:?}");
        assert!(s.contains("user"));
        assert!(!s.contains("\"password\""));
        assert_eq!("None", format!("{:?}", Authentication::None));
    }

    #[test]
    fn t_body_text() {
        let mut expected = Expected::default();
        assert_eq!(None, expected.body_text());
        expected.body_text = Some(String::new());
        assert_eq!(None, expected.body_text());
        expected.body_text = Some("foobar".to_string());
        assert_eq!(Some("foobar"), expected.body_text());
    }
}
