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
//!
//! Issues one HTTP(S) request, validates the response against status codes,
//! body text and certificate expiry, and maps the outcome to a monitoring
//! plugin state.
//!
//! ```no_run
//! # async fn run() {
//! use hhc::{check, Expected, Request};
//!
//! let request = Request {
//!     host: "httpbin.org".to_string(),
//!     uri: "/status/200".to_string(),
//!     ..Default::default()
//! };
//! let expected = Expected {
//!     status_codes: vec![200],
//!     ..Default::default()
//! };
//! let (message, state, _error) = check(&request, &expected).await.into_parts();
//! println!("{message}");
//! std::process::exit(state.code());
//! # }
//! ```

pub use checked::{Checked, ExitState, Expiry, Outcome};
pub use checker::check;
pub use error::CheckError;
pub use request::{Authentication, Expected, Request, Scheme, SslCheck};

mod checked;
mod checker;
mod error;
mod request;
