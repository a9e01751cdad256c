//! # Ptth
//!
//! A fluent request builder and a buffered response wrapper on top of
//! a small HTTP client. Configure the method, URL, headers, query or
//! form parameters, timeouts, proxy, cookies and body, call
//! [`execute`](struct.Request.html#method.execute), and read back the
//! status, headers, cookies and body as bytes, a string, a file or
//! JSON.
//!
//! The network side is left to an [`HttpEngine`]. By default that is
//! [`MinreqEngine`], which hands the request to
//! [`minreq`](https://crates.io/crates/minreq). Anything implementing
//! the trait can be used instead with
//! [`execute_with`](struct.Request.html#method.execute_with).
//!
//! # Additional features
//!
//! There are no default features. Optional functionality is enabled by
//! specifying features for the `ptth` dependency in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! ptth = { version = "0.3", features = ["https"] }
//! ```
//!
//! ## `https` or `https-rustls`
//!
//! Lets the default engine talk to `https://` URLs, using
//! [`rustls`](https://crates.io/crates/rustls). `https-rustls-probe`,
//! `https-native` and `https-bundled` pick the other TLS backends
//! minreq offers.
//!
//! ## `json-using-serde`
//!
//! Adds [`with_json()`](struct.Request.html#method.with_json) and
//! [`json()`](struct.Response.html#method.json), backed by
//! [`serde_json`](https://crates.io/crates/serde_json). Without it,
//! [`as_json()`](struct.Response.html#method.as_json) still hands the
//! decoded body to a parser of your choice.
//!
//! ## `punycode`
//!
//! Lets the default engine reach non-ascii domains.
//!
//! # Examples
//!
//! ## Get
//!
//! For GET requests, parameters are appended to the URL as a query
//! string.
//!
//! ```no_run
//! # fn main() -> Result<(), ptth::Error> {
//! let response = ptth::get("http://example.com/search")
//!     .with_param("q", "rust")
//!     .with_param("page", "2")
//!     .execute()?;
//! println!("{} took {} ms", response.status_code, response.elapsed_millis());
//! println!("{}", response.as_string()?);
//! # Ok(()) }
//! ```
//!
//! ## Post
//!
//! For every other method, the same parameters become a
//! `application/x-www-form-urlencoded` body instead. An explicit body
//! set with [`with_body`](struct.Request.html#method.with_body) or
//! [`with_text`](struct.Request.html#method.with_text) replaces them.
//!
//! ```
//! let wire = ptth::post("http://example.com/login")
//!     .with_param("user", "ady")
//!     .with_param("pass", "s3cr3t")
//!     .to_wire_request();
//! assert_eq!(wire.url, "http://example.com/login");
//! assert_eq!(wire.entity.as_deref(), Some(&b"user=ady&pass=s3cr3t"[..]));
//! ```
//!
//! ## Status codes
//!
//! A status other than 200 is an
//! [`UnexpectedStatus`](enum.Error.html#variant.UnexpectedStatus) error,
//! which still carries the buffered response. Turn that off with
//! [`with_force_ok(false)`](struct.Request.html#method.with_force_ok)
//! to inspect the response yourself.
//!
//! ```no_run
//! # fn main() -> Result<(), ptth::Error> {
//! let response = ptth::get("http://example.com/missing")
//!     .with_force_ok(false)
//!     .execute()?;
//! if !response.is_ok() {
//!     println!("got {}", response.status_code);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Cookies
//!
//! Requests have no cookie jar unless one is asked for. Share a jar
//! between requests to keep a session:
//!
//! ```no_run
//! # fn main() -> Result<(), ptth::Error> {
//! let jar = ptth::CookieJar::shared();
//! ptth::post("http://example.com/login")
//!     .with_param("user", "ady")
//!     .with_cookie_jar(jar.clone())
//!     .execute()?;
//! let response = ptth::get("http://example.com/me")
//!     .with_cookie_jar(jar)
//!     .execute()?;
//! println!("session: {:?}", response.cookie_value("sid"));
//! # Ok(()) }
//! ```
//!
//! # Timeouts
//!
//! By default, a request has no timeout. Set one per request with
//! [`with_connect_timeout`](struct.Request.html#method.with_connect_timeout)
//! and [`with_read_timeout`](struct.Request.html#method.with_read_timeout)
//! (milliseconds), or for the whole process with the
//! `PTTH_CONNECT_TIMEOUT` and `PTTH_READ_TIMEOUT` environment variables,
//! see [`RequestConfig`].
//!
//! # Logging
//!
//! Requests are logged through the [`log`](https://crates.io/crates/log)
//! facade: the request line at `trace`, the status and time taken at
//! `debug`. Install any logger to see them.

#![deny(missing_docs)]

mod config;
mod connection;
mod cookie;
mod error;
mod http_url;
mod proxy;
mod request;
mod response;
mod site_address;

pub use config::*;
pub use connection::*;
pub use cookie::{Cookie, CookieJar, CookieJarHandle};
pub use encoding_rs::Encoding;
pub use error::*;
pub use http_url::{build_url, build_url_from_map};
pub use proxy::*;
pub use request::*;
pub use response::*;
pub use site_address::local_site_address;
