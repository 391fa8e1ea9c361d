#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! HTTP Health Check

use chrono::Utc;
use clap::Parser;
use log::debug;

use hhc::{check, Authentication, Checked, Expected, Request, Scheme, SslCheck};

#[derive(Debug, Parser)]
#[command(author, about, version)]
struct Opts {
    /// URL scheme, http or https
    #[arg(long, env = "HHC_SCHEME", default_value = "https")]
    scheme: Scheme,
    /// Host name
    #[arg(short = 'H', long, env = "HHC_HOST")]
    host: String,
    /// TCP port, defaults to the port of the scheme
    #[arg(short, long, env = "HHC_PORT")]
    port: Option<u16>,
    /// Path and query string
    #[arg(short, long, env = "HHC_URI", default_value = "/")]
    uri: String,
    /// Timeout in seconds
    #[arg(short, long = "timeout", env = "HHC_TIMEOUT", default_value = "30")]
    timeout_in_secs: u64,
    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
    /// User of basic authentication
    #[arg(long, env = "HHC_USER", requires = "password")]
    user: Option<String>,
    /// Password of basic authentication
    #[arg(long, env = "HHC_PASSWORD", requires = "user")]
    password: Option<String>,
    /// Expected status codes separated with comma e.g. 200,302
    #[arg(
        short = 'e',
        long = "status",
        env = "HHC_STATUS",
        value_delimiter = ',',
        default_value = "200"
    )]
    status_codes: Vec<u16>,
    /// Text the response body must contain
    #[arg(short = 's', long, env = "HHC_BODY_TEXT")]
    body_text: Option<String>,
    /// Check expiry of the certificate
    #[arg(short = 'S', long)]
    ssl: bool,
    /// WARNING when the certificate expires in fewer days
    #[arg(short = 'w', long, env = "HHC_DAYS_WARNING", default_value = "30")]
    days_warning: i64,
    /// CRITICAL when the certificate expires in fewer days
    #[arg(short = 'c', long, env = "HHC_DAYS_CRITICAL", default_value = "14")]
    days_critical: i64,
}

impl Opts {
    fn build(&self) -> anyhow::Result<(Request, Expected)> {
        let ssl_check = if self.ssl {
            anyhow::ensure!(
                self.days_critical < self.days_warning,
                "days critical ({}) must be less than days warning ({})",
                self.days_critical,
                self.days_warning
            );
            Some(SslCheck {
                days_warning: self.days_warning,
                days_critical: self.days_critical,
            })
        } else {
            None
        };

        let authentication = match (&self.user, &self.password) {
            (Some(user), Some(password)) => Authentication::Basic {
                user: user.clone(),
                password: password.clone(),
            },
            _ => Authentication::None,
        };

        let request = Request {
            scheme: self.scheme,
            host: self.host.clone(),
            port: self.port.unwrap_or_else(|| self.scheme.default_port()),
            uri: self.uri.clone(),
            timeout_in_secs: self.timeout_in_secs,
            verbose: self.verbose,
            authentication,
        };
        let expected = Expected {
            status_codes: self.status_codes.clone(),
            body_text: self.body_text.clone(),
            ssl_check,
        };
        Ok((request, expected))
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let opts: Opts = Opts::parse();
    let checked = match opts.build() {
        Ok((request, expected)) => check(&request, &expected).await,
        Err(e) => Checked::misconfigured(e.to_string(), Utc::now().timestamp()),
    };

    let (message, state, error) = checked.into_parts();
    if let Some(e) = error {
        debug!("transport error {e:?}");
    }
    println!("{message}");
    std::process::exit(state.code());
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Opts {
        let mut argv = vec!["hhc"];
        argv.extend_from_slice(args);
        Opts::try_parse_from(argv).unwrap()
    }

    #[test]
    fn t_defaults() -> anyhow::Result<()> {
        let opts = parse(&["-H", "httpbin.org"]);
        let (request, expected) = opts.build()?;
        assert_eq!(Scheme::Https, request.scheme);
        assert_eq!(443, request.port);
        assert_eq!("/", request.uri);
        assert_eq!(30, request.timeout_in_secs);
        assert_eq!(Authentication::None, request.authentication);
        assert_eq!(vec![200], expected.status_codes);
        assert!(expected.ssl_check.is_none());
        Ok(())
    }

    #[test]
    fn t_http_port() -> anyhow::Result<()> {
        let opts = parse(&["-H", "httpbin.org", "--scheme", "http"]);
        let (request, _) = opts.build()?;
        assert_eq!(80, request.port);

        let opts = parse(&["-H", "httpbin.org", "--scheme", "http", "-p", "8080"]);
        let (request, _) = opts.build()?;
        assert_eq!(8080, request.port);
        Ok(())
    }

    #[test]
    fn t_status_codes() -> anyhow::Result<()> {
        let opts = parse(&["-H", "httpbin.org", "-e", "200,302", "--status", "404"]);
        let (_, expected) = opts.build()?;
        assert_eq!(vec![200, 302, 404], expected.status_codes);
        Ok(())
    }

    #[test]
    fn t_basic_auth() -> anyhow::Result<()> {
        let opts = parse(&[
            "-H",
            "httpbin.org",
            "--user",
            "user",
            "--password",
            "password",
        ]);
        let (request, _) = opts.build()?;
        assert_eq!(
            Authentication::Basic {
                user: "user".to_string(),
                password: "password".to_string(),
            },
            request.authentication
        );

        let argv = ["hhc", "-H", "httpbin.org", "--user", "user"];
        assert!(Opts::try_parse_from(argv).is_err());
        Ok(())
    }

    #[test]
    fn t_ssl_check() -> anyhow::Result<()> {
        let opts = parse(&["-H", "httpbin.org", "-S", "-w", "20", "-c", "5"]);
        let (_, expected) = opts.build()?;
        assert_eq!(
            Some(SslCheck {
                days_warning: 20,
                days_critical: 5
            }),
            expected.ssl_check
        );
        Ok(())
    }

    #[test]
    fn t_inverted_days() {
        let opts = parse(&["-H", "httpbin.org", "-S", "-w", "5", "-c", "20"]);
        assert!(opts.build().is_err());

        // ignored without --ssl
        let opts = parse(&["-H", "httpbin.org", "-w", "5", "-c", "20"]);
        assert!(opts.build().is_ok());
    }
}
