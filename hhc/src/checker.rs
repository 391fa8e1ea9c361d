use std::time::Instant;

use chrono::{DateTime, SubsecRound as _, Utc};
use log::debug;
use reqwest::redirect::Policy;
use reqwest::tls::TlsInfo;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use x509_parser::parse_x509_certificate;

use crate::checked::{Checked, ExitState, Expiry, Outcome};
use crate::error::CheckError;
use crate::request::{Authentication, Expected, Request, Scheme, SslCheck};

const SECONDS_PER_DAY: i64 = 86_400;

/// Perform one request and judge the response
///
/// Rules run in order (status code, body text, certificate expiry) and the
/// first failing rule decides the result. Transport failures are `CRITICAL`
/// and carry a [`CheckError`]; failed rules never do.
///
/// ```no_run
/// # async fn run() {
/// use hhc::{check, Expected, Request, SslCheck};
///
/// let request = Request {
///     host: "httpbin.org".to_string(),
///     uri: "/anything".to_string(),
///     ..Default::default()
/// };
/// let expected = Expected {
///     status_codes: vec![200],
///     ssl_check: Some(SslCheck::default()),
///     ..Default::default()
/// };
/// println!("{}", check(&request, &expected).await);
/// # }
/// ```
pub async fn check(request: &Request, expected: &Expected) -> Checked {
    let checked_at = Utc::now().round_subsecs(0);

    if expected.status_codes.is_empty() {
        return Checked::misconfigured("no expected status codes", checked_at.timestamp());
    }
    if request.timeout_in_secs == 0 {
        let reason = "timeout must be at least 1 second";
        return Checked::misconfigured(reason, checked_at.timestamp());
    }
    let url = match request.url() {
        Ok(url) => url,
        Err(e) => return Checked::misconfigured(e.to_string(), checked_at.timestamp()),
    };
    let client = match build_client(request) {
        Ok(client) => client,
        Err(e) => return Checked::transport(e, checked_at.timestamp()),
    };

    let mut builder = client.get(url.clone());
    if let Authentication::Basic { user, password } = &request.authentication {
        builder = builder.basic_auth(user, Some(password));
    }

    debug!("check {url} with timeout {}s", request.timeout_in_secs);
    let start = Instant::now();
    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("failed to send request to {url}: {e:?}");
            let e = CheckError::sending(&e, request.timeout_in_secs);
            return Checked::transport(e, checked_at.timestamp());
        }
    };

    let status = response.status().as_u16();
    let certificate = response
        .extensions()
        .get::<TlsInfo>()
        .and_then(TlsInfo::peer_certificate)
        .map(<[u8]>::to_vec);
    debug!("{url} responded with {status}");

    let mut checked = judge(status, expected, request.scheme, certificate, &checked_at);
    if matches!(checked.outcome, Outcome::UnexpectedStatus { .. }) {
        return checked;
    }

    // the body is only needed for the text rule or the verbose summary
    if expected.body_text().is_some() || request.verbose {
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!("failed to read body of {url}: {e:?}");
                let e = CheckError::reading(&e, request.timeout_in_secs);
                return Checked::transport(e, checked_at.timestamp());
            }
        };
        if let Some(text) = expected.body_text() {
            if !contains(&body, text) {
                debug!("body of {url} does not contain {text:?}");
                checked = Checked::new(
                    ExitState::Critical,
                    Outcome::MissingBodyText(text.to_string()),
                    checked_at.timestamp(),
                );
            }
        }
        if request.verbose {
            checked.size = Some(body.len());
        }
    }

    if request.verbose {
        checked.elapsed = Some(start.elapsed().as_millis());
    }
    checked
}

// Status code first, then certificate. The body rule sits between the two
// and overrides whatever this returns when it fails.
fn judge(
    status: u16,
    expected: &Expected,
    scheme: Scheme,
    certificate: Option<Vec<u8>>,
    checked_at: &DateTime<Utc>,
) -> Checked {
    let checked_at_ts = checked_at.timestamp();
    if !expected.accepts(status) {
        debug!("status {status} is not in {:?}", expected.status_codes);
        return Checked::new(
            ExitState::Critical,
            Outcome::UnexpectedStatus {
                status,
                expected: expected.status_codes.clone(),
            },
            checked_at_ts,
        );
    }

    let ssl_check = match expected.ssl_check {
        Some(ssl_check) if scheme == Scheme::Https => ssl_check,
        _ => {
            return Checked::new(
                ExitState::Ok,
                Outcome::Passed {
                    status,
                    expiry: None,
                },
                checked_at_ts,
            )
        }
    };

    let not_after = match certificate
        .ok_or_else(|| "no peer certificate presented".to_string())
        .and_then(|der| not_after(&der))
    {
        Ok(not_after) => not_after,
        Err(e) => {
            return Checked::new(
                ExitState::Critical,
                Outcome::CertificateUnreadable(e),
                checked_at_ts,
            )
        }
    };

    let expiry = Expiry {
        days: days_remaining(not_after, checked_at),
        not_after,
    };
    let state = certificate_state(expiry.days, &ssl_check);
    debug!("certificate expires in {} days, {state}", expiry.days);
    let outcome = match state {
        ExitState::Ok => Outcome::Passed {
            status,
            expiry: Some(expiry),
        },
        ExitState::Critical => Outcome::CertificateExpiring {
            expiry,
            threshold: ssl_check.days_critical,
        },
        _ => Outcome::CertificateExpiring {
            expiry,
            threshold: ssl_check.days_warning,
        },
    };
    Checked::new(state, outcome, checked_at_ts)
}

/// Most severe tripped threshold wins
pub(crate) fn certificate_state(days: i64, ssl_check: &SslCheck) -> ExitState {
    if days < ssl_check.days_critical {
        ExitState::Critical
    } else if days < ssl_check.days_warning {
        ExitState::Warning
    } else {
        ExitState::Ok
    }
}

/// Whole days between now and expiry, floored
pub(crate) fn days_remaining(not_after: i64, checked_at: &DateTime<Utc>) -> i64 {
    (not_after - checked_at.timestamp()).div_euclid(SECONDS_PER_DAY)
}

fn not_after(der: &[u8]) -> Result<i64, String> {
    let (_, cert) = parse_x509_certificate(der).map_err(|e| e.to_string())?;
    Ok(cert.validity().not_after.timestamp())
}

fn contains(body: &[u8], text: &str) -> bool {
    String::from_utf8_lossy(body).contains(text)
}

fn build_client(request: &Request) -> Result<reqwest::Client, CheckError> {
    reqwest::Client::builder()
        .timeout(request.timeout())
        .connect_timeout(request.timeout())
        .redirect(Policy::none())
        .use_preconfigured_tls(tls_config())
        .tls_info(true)
        .build()
        .map_err(|e| CheckError::Client(e.to_string()))
}

fn tls_config() -> ClientConfig {
    let mut root_store = RootCertStore::empty();
    root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));

    ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
