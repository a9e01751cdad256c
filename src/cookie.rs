//! A small in-memory cookie jar.
//!
//! Requests carry an optional [`CookieJarHandle`]. The engine reads the
//! matching cookies out of it before sending and stores any
//! `Set-Cookie` response headers back into it afterwards. The jar does
//! no persistence and only understands the `Domain`, `Path`, `Secure`,
//! `Max-Age` and `Version` attributes.

use crate::http_url::UrlTarget;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

/// A cookie jar shared between requests.
pub type CookieJarHandle = Arc<RwLock<CookieJar>>;

/// A single cookie.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cookie {
    /// The cookie name.
    pub name: String,
    /// The cookie value.
    pub value: String,
    /// The domain the cookie is sent to. `None` means the host that
    /// set it, which the jar can't tell apart from any other host, so
    /// such cookies are sent everywhere.
    pub domain: Option<String>,
    /// The path prefix the cookie is sent for.
    pub path: Option<String>,
    /// When the cookie stops being sent. `None` for session cookies.
    pub expiry: Option<SystemTime>,
    /// Only send the cookie over `https://`.
    pub secure: bool,
    /// The cookie version, 0 for netscape-style cookies.
    pub version: i32,
}

impl Cookie {
    /// Creates a session cookie valid for every domain and path.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Cookie {
        Cookie {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expiry: None,
            secure: false,
            version: 0,
        }
    }

    /// Returns true if the cookie has an expiry in the past.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }

    /// Parses the value of a `Set-Cookie` header. `host` is used as the
    /// domain if the header doesn't name one.
    pub fn parse_set_cookie(header: &str, host: &str) -> Option<Cookie> {
        let mut attributes = header.split(';');
        let (name, value) = attributes.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        cookie.domain = Some(host.to_ascii_lowercase());
        for attribute in attributes {
            let (key, value) = match attribute.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (attribute.trim(), ""),
            };
            if key.eq_ignore_ascii_case("domain") && !value.is_empty() {
                cookie.domain = Some(value.trim_start_matches('.').to_ascii_lowercase());
            } else if key.eq_ignore_ascii_case("path") && !value.is_empty() {
                cookie.path = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if key.eq_ignore_ascii_case("max-age") {
                if let Ok(seconds) = value.parse::<i64>() {
                    // Lifetimes past what SystemTime can hold are kept as
                    // session cookies.
                    cookie.expiry = if seconds <= 0 {
                        Some(SystemTime::UNIX_EPOCH)
                    } else {
                        SystemTime::now().checked_add(Duration::from_secs(seconds as u64))
                    };
                }
            } else if key.eq_ignore_ascii_case("version") {
                if let Ok(version) = value.parse() {
                    cookie.version = version;
                }
            }
        }
        Some(cookie)
    }

    fn matches(&self, target: &UrlTarget) -> bool {
        if self.secure && !target.https {
            return false;
        }
        if let Some(domain) = &self.domain {
            if !domain_matches(&target.host, domain) {
                return false;
            }
        }
        match &self.path {
            Some(path) => target.path.starts_with(path.as_str()),
            None => true,
        }
    }
}

/// An ordered store of cookies.
///
/// Adding a cookie replaces any cookie with the same name, domain and
/// path, keeping its position.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> CookieJar {
        CookieJar::default()
    }

    /// Creates an empty jar behind a [`CookieJarHandle`].
    pub fn shared() -> CookieJarHandle {
        Arc::new(RwLock::new(CookieJar::new()))
    }

    /// Adds a cookie, replacing one with the same name, domain and
    /// path.
    pub fn add(&mut self, cookie: Cookie) {
        let same = |other: &Cookie| {
            other.name == cookie.name && other.domain == cookie.domain && other.path == cookie.path
        };
        match self.cookies.iter_mut().find(|other| same(other)) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// Returns all the cookies in the jar, expired ones included.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Returns the first cookie with the given name, compared
    /// case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name.eq_ignore_ascii_case(name))
    }

    /// Returns the number of cookies in the jar.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Removes cookies whose expiry is before `now`. Returns true if
    /// any were removed.
    pub fn clear_expired(&mut self, now: SystemTime) -> bool {
        let before = self.cookies.len();
        self.cookies.retain(|cookie| !cookie.is_expired(now));
        before != self.cookies.len()
    }

    /// Removes every cookie.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Builds the `Cookie` request header value for `url`, or `None` if
    /// nothing in the jar should be sent there.
    pub fn request_header(&self, url: &str) -> Option<String> {
        let target = UrlTarget::parse(url)?;
        let now = SystemTime::now();
        let value = self
            .cookies
            .iter()
            .filter(|cookie| !cookie.is_expired(now) && cookie.matches(&target))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Stores a `Set-Cookie` header received from `url`. Returns false
    /// if the header couldn't be understood, or if it names a `Domain`
    /// the host of `url` doesn't belong to.
    pub fn store_set_cookie(&mut self, url: &str, header: &str) -> bool {
        let host = UrlTarget::parse(url).map(|target| target.host);
        let host = host.as_deref().unwrap_or_default();
        let cookie = match Cookie::parse_set_cookie(header, host) {
            Some(cookie) => cookie,
            None => return false,
        };
        if let Some(domain) = &cookie.domain {
            if !domain_matches(host, domain) {
                log::debug!(
                    "Rejecting cookie {} for domain {} set by {}.",
                    cookie.name,
                    domain,
                    host
                );
                return false;
            }
        }
        self.add(cookie);
        true
    }
}

/// Returns true if `host` is `domain` or one of its subdomains.
fn domain_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    host == domain
        || (host.ends_with(&domain) && host[..host.len() - domain.len()].ends_with('.'))
}

pub(crate) fn read_jar(handle: &CookieJarHandle) -> RwLockReadGuard<'_, CookieJar> {
    handle.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_jar(handle: &CookieJarHandle) -> RwLockWriteGuard<'_, CookieJar> {
    handle.write().unwrap_or_else(PoisonError::into_inner)
}
