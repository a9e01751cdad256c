use crate::connection::{HttpEngine, MinreqEngine};
use crate::cookie::{write_jar, Cookie, CookieJar, CookieJarHandle};
use crate::http_url::{build_url, encode_pairs, starts_with_ignore_case};
use crate::site_address::{BROWSER_USER_AGENT, DEFAULT_USER_AGENT};
use crate::{Error, Proxy, RequestConfig, Response};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;
use std::time::{Duration, Instant, SystemTime};

/// A URL type for requests.
pub type URL = String;

/// An HTTP request method.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Method {
    /// The GET method
    Get,
    /// The HEAD method
    Head,
    /// The POST method
    Post,
    /// The PUT method
    Put,
    /// The DELETE method
    Delete,
    /// The CONNECT method
    Connect,
    /// The OPTIONS method
    Options,
    /// The TRACE method
    Trace,
    /// The PATCH method
    Patch,
    /// A custom method, use with care: the string will be embedded in
    /// your request as-is.
    Custom(String),
}

impl Method {
    /// Returns true if requests with this method send their entity as
    /// the request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl From<&str> for Method {
    /// Matches the standard methods case-insensitively, anything else
    /// becomes a [`Method::Custom`] kept as given.
    fn from(method: &str) -> Method {
        const STANDARD: [(&str, Method); 9] = [
            ("GET", Method::Get),
            ("HEAD", Method::Head),
            ("POST", Method::Post),
            ("PUT", Method::Put),
            ("DELETE", Method::Delete),
            ("CONNECT", Method::Connect),
            ("OPTIONS", Method::Options),
            ("TRACE", Method::Trace),
            ("PATCH", Method::Patch),
        ];
        STANDARD
            .into_iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(method))
            .map(|(_, method)| method)
            .unwrap_or_else(|| Method::Custom(method.to_string()))
    }
}

impl fmt::Display for Method {
    /// Formats the Method to the form in the HTTP request,
    /// ie. Method::Get -> "GET", Method::Post -> "POST", etc.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Connect => write!(f, "CONNECT"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Trace => write!(f, "TRACE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Custom(ref s) => write!(f, "{}", s),
        }
    }
}

/// A query or form parameter.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NameValuePair {
    /// The parameter name.
    pub name: String,
    /// The parameter value.
    pub value: String,
}

impl NameValuePair {
    /// Creates a parameter.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> NameValuePair {
        NameValuePair {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for NameValuePair {
    fn from((name, value): (N, V)) -> NameValuePair {
        NameValuePair::new(name, value)
    }
}

/// A request as it goes to the HTTP engine: the final URL, the headers
/// in order, and the body, if the method carries one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WireRequest {
    /// The request method.
    pub method: Method,
    /// The URL including the query string for GET requests.
    pub url: URL,
    /// The request headers, in the order they were added.
    pub headers: Vec<(String, String)>,
    /// The request body.
    pub entity: Option<Vec<u8>>,
}

const REFERER: &str = "Referer";
const USER_AGENT: &str = "User-Agent";
const CONTENT_TYPE: &str = "Content-Type";

/// An HTTP request.
///
/// Generally created by the [`ptth::get`](fn.get.html)-style
/// functions, corresponding to the HTTP method we want to use, and
/// configured with the `with_*` methods before calling
/// [`execute`](#method.execute).
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), ptth::Error> {
/// let response = ptth::get("http://example.com/search")
///     .with_param("q", "rust")
///     .with_self_referer()
///     .with_read_timeout(5_000)
///     .execute()?;
/// println!("{}", response.as_string()?);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    uri: URL,
    pub(crate) method: Method,
    encoding: &'static Encoding,
    headers: Vec<(String, String)>,
    params: Vec<NameValuePair>,
    body: Option<Vec<u8>>,
    pub(crate) config: RequestConfig,
    cookie_jar: Option<CookieJarHandle>,
    force_ok: bool,
    retry: u32,
}

impl Request {
    /// Creates a new HTTP `Request` with UTF-8 as its character
    /// encoding.
    ///
    /// This is only the request's data, it is not sent yet. For
    /// sending the request, see [`execute`](#method.execute).
    ///
    /// The request starts out with the default user agent (see
    /// [`with_default_user_agent`](#method.with_default_user_agent))
    /// and the timeouts of [`RequestConfig::from_env`].
    ///
    /// Method names are matched case-insensitively and the standard
    /// ones are normalised: `Request::new("get", ..)` is a
    /// [`Method::Get`] and shows up as `GET` in
    /// [`to_debug_string`](#method.to_debug_string) and on the wire.
    /// Other names are kept as given.
    pub fn new<M: Into<Method>, T: Into<URL>>(method: M, uri: T) -> Request {
        Request {
            uri: uri.into(),
            method: method.into(),
            encoding: UTF_8,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            config: RequestConfig::from_env(),
            cookie_jar: None,
            force_ok: true,
            retry: 0,
        }
        .with_default_user_agent()
    }

    /// Sets the character encoding used for the query string, the form
    /// body and [`with_text`](#method.with_text).
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Request {
        self.encoding = encoding;
        self
    }

    /// Sets the request method.
    pub fn with_method<M: Into<Method>>(mut self, method: M) -> Request {
        self.method = method.into();
        self
    }

    /// Adds a header. Headers added more than once are kept more than
    /// once.
    pub fn with_header<T: Into<String>, U: Into<String>>(mut self, name: T, value: U) -> Request {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds headers from a flat `[name, value, name, value, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// if the list has an odd length. Nothing is added in that case.
    pub fn with_headers<S: AsRef<str>>(self, headers: &[S]) -> Result<Request, Error> {
        let pairs = flat_pairs("headers", headers)?;
        Ok(pairs
            .into_iter()
            .fold(self, |request, (name, value)| request.with_header(name, value)))
    }

    /// Removes every header called `name`, compared case-insensitively.
    pub fn without_header(mut self, name: &str) -> Request {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self
    }

    /// Replaces the `Referer` header.
    pub fn with_referer<T: Into<String>>(self, referer: T) -> Request {
        self.without_header(REFERER).with_header(REFERER, referer)
    }

    /// Replaces the `Referer` header with the request's own URI.
    pub fn with_self_referer(self) -> Request {
        let uri = self.uri.clone();
        self.with_referer(uri)
    }

    /// Replaces the `User-Agent` header.
    pub fn with_user_agent<T: Into<String>>(self, user_agent: T) -> Request {
        self.without_header(USER_AGENT).with_header(USER_AGENT, user_agent)
    }

    /// Replaces the `User-Agent` header with the default one, which
    /// names this library and the private addresses of this host (see
    /// [`local_site_address`](fn.local_site_address.html)), so servers
    /// can tell which machine a request came from.
    pub fn with_default_user_agent(self) -> Request {
        self.with_user_agent(DEFAULT_USER_AGENT.as_str())
    }

    /// Replaces the `User-Agent` header with a desktop browser's.
    pub fn with_browser_user_agent(self) -> Request {
        self.with_user_agent(BROWSER_USER_AGENT)
    }

    /// Adds a parameter. For GET requests parameters go into the query
    /// string, for everything else they make up a form body.
    pub fn with_param<T: Into<String>, U: Into<String>>(mut self, name: T, value: U) -> Request {
        self.params.push(NameValuePair::new(name, value));
        self
    }

    /// Adds a parameter if `value` is `Some`, formatted with `Display`.
    pub fn with_optional_param<T: Into<String>, U: fmt::Display>(
        self,
        name: T,
        value: Option<U>,
    ) -> Request {
        match value {
            Some(value) => self.with_param(name, value.to_string()),
            None => self,
        }
    }

    /// Adds parameters from a flat `[name, value, name, value, ...]`
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`](enum.Error.html#variant.InvalidArgument)
    /// if the list has an odd length. Nothing is added in that case.
    pub fn with_params<S: AsRef<str>>(mut self, params: &[S]) -> Result<Request, Error> {
        let pairs = flat_pairs("params", params)?;
        self.params.extend(
            pairs
                .into_iter()
                .map(|(name, value)| NameValuePair::new(name, value)),
        );
        Ok(self)
    }

    /// Adds every pair of `params`, in iteration order.
    pub fn with_param_pairs<I, P>(mut self, params: I) -> Request
    where
        I: IntoIterator<Item = P>,
        P: Into<NameValuePair>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Adds every entry of a map as a parameter. The order follows the
    /// map's iteration order, so use a `BTreeMap` or an ordered map when
    /// the query string has to be stable.
    pub fn with_param_map<I, K, V>(self, params: I) -> Request
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.with_param_pairs(
            params
                .into_iter()
                .map(|(name, value)| NameValuePair::new(name, value)),
        )
    }

    /// Sets the request body. The body wins over any parameters: once
    /// set, parameters no longer end up in the body.
    pub fn with_body<T: Into<Vec<u8>>>(mut self, body: T) -> Request {
        self.body = Some(body.into());
        self
    }

    /// Sets the request body to `text`, encoded with the request's
    /// character encoding.
    pub fn with_text(self, text: &str) -> Request {
        let (bytes, _, _) = self.encoding.encode(text);
        let bytes = bytes.into_owned();
        self.with_body(bytes)
    }

    /// Converts given argument to JSON and sets it as body.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`SerdeJsonError`](enum.Error.html#variant.SerdeJsonError) if
    /// Serde runs into a problem when converting `body` into a
    /// string.
    #[cfg(feature = "json-using-serde")]
    pub fn with_json<T: serde::ser::Serialize>(self, body: &T) -> Result<Request, Error> {
        let json = serde_json::to_vec(body).map_err(Error::SerdeJsonError)?;
        Ok(self
            .without_header(CONTENT_TYPE)
            .with_header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .with_body(json))
    }

    /// Sets the connect timeout in milliseconds.
    pub fn with_connect_timeout(mut self, millis: u64) -> Request {
        self.config.connect_timeout = Some(Duration::from_millis(millis));
        self
    }

    /// Sets the read timeout in milliseconds.
    pub fn with_read_timeout(mut self, millis: u64) -> Request {
        self.config.read_timeout = Some(Duration::from_millis(millis));
        self
    }

    /// Sets the HTTP proxy to connect through.
    pub fn with_proxy<S: Into<String>>(self, host: S, port: u16) -> Request {
        self.with_proxy_config(Proxy::new(host, port))
    }

    /// Sets the HTTP proxy to connect through.
    pub fn with_proxy_config(mut self, proxy: Proxy) -> Request {
        self.config.proxy = Some(proxy);
        self
    }

    /// Sets whether a response status other than 200 makes
    /// [`execute`](#method.execute) fail. Enabled by default.
    pub fn with_force_ok(mut self, force_ok: bool) -> Request {
        self.force_ok = force_ok;
        self
    }

    /// Records how many times the caller means to retry this request.
    /// The request itself never retries: each attempt should be a new
    /// `execute` on a fresh clone.
    pub fn with_retry(mut self, count: u32) -> Request {
        self.retry = count;
        self
    }

    /// Gives the request a new, empty cookie jar.
    pub fn with_cookie_store(self) -> Request {
        self.with_cookie_jar(CookieJar::shared())
    }

    /// Uses `jar` for this request. The jar can be shared with other
    /// requests to carry a session along.
    pub fn with_cookie_jar(mut self, jar: CookieJarHandle) -> Request {
        self.cookie_jar = Some(jar);
        self
    }

    /// Adds a cookie, creating a cookie jar first if the request has
    /// none. The cookie is marked secure if the URI is `https://`.
    pub fn add_cookie<N: Into<String>, V: Into<String>>(
        mut self,
        name: N,
        value: V,
        domain: &str,
        path: &str,
        expiry: Option<SystemTime>,
        version: i32,
    ) -> Request {
        let cookie = Cookie {
            name: name.into(),
            value: value.into(),
            domain: Some(domain.to_string()),
            path: Some(path.to_string()),
            expiry,
            secure: self.is_secure(),
            version,
        };
        let jar = self.cookie_jar.get_or_insert_with(CookieJar::shared);
        write_jar(jar).add(cookie);
        self
    }

    fn is_secure(&self) -> bool {
        starts_with_ignore_case(&self.uri, "https://")
    }

    /// The URI the request was created with.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The character encoding of the request.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// The headers, in the order they were added.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The parameters, in the order they were added.
    pub fn params(&self) -> &[NameValuePair] {
        &self.params
    }

    /// The connection settings.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// The cookie jar, if the request has one.
    pub fn cookie_jar(&self) -> Option<&CookieJarHandle> {
        self.cookie_jar.as_ref()
    }

    /// Whether a status other than 200 fails the request.
    pub fn force_ok(&self) -> bool {
        self.force_ok
    }

    /// The retry count set with [`with_retry`](#method.with_retry).
    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns true for GET requests.
    pub fn is_get(&self) -> bool {
        self.method == Method::Get
    }

    /// Returns true for POST requests.
    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }

    /// The full URL: for GET requests the parameters are appended as a
    /// query string, every other method uses the URI as-is.
    pub fn url(&self) -> String {
        if self.is_get() {
            build_url(&self.uri, self.encoding, &self.params)
        } else {
            self.uri.clone()
        }
    }

    /// The request entity: the explicit body if one was set, otherwise
    /// the form-encoded parameters, otherwise nothing.
    pub fn entity(&self) -> Option<Cow<'_, [u8]>> {
        if let Some(body) = &self.body {
            return Some(Cow::Borrowed(body));
        }
        if self.params.is_empty() {
            None
        } else {
            let form = encode_pairs(self.encoding, &self.params);
            Some(Cow::Owned(form.into_bytes()))
        }
    }

    /// Turns the request into what the HTTP engine sends.
    pub fn to_wire_request(&self) -> WireRequest {
        if self.body.is_some() && !self.params.is_empty() {
            log::warn!(
                "{} {} has both a body and {} parameters, the parameters are not sent in the body.",
                self.method,
                self.uri,
                self.params.len()
            );
        }

        let mut headers = self.headers.clone();
        let entity = if self.method.carries_body() {
            self.entity().map(Cow::into_owned)
        } else {
            None
        };
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
        if entity.is_some() && self.body.is_none() && !has_content_type {
            headers.push((
                CONTENT_TYPE.to_string(),
                format!(
                    "application/x-www-form-urlencoded; charset={}",
                    self.encoding.name()
                ),
            ));
        }

        WireRequest {
            method: self.method.clone(),
            url: self.url(),
            headers,
            entity,
        }
    }

    /// Renders the request for logs: the request line, the headers, and
    /// the full URL (GET) or the decoded body (POST, PUT and PATCH).
    pub fn to_debug_string(&self) -> String {
        let mut buf = String::with_capacity(1024);
        // Writing into a String can't fail.
        let _ = writeln!(buf, "{} {}", self.method, self.uri);
        if !self.headers.is_empty() {
            buf.push_str("HEADERS: ");
            for (name, value) in &self.headers {
                let _ = writeln!(buf, "{}={}", name, value);
            }
        }
        if self.is_get() {
            let _ = writeln!(buf, "URL: {}", self.url());
        } else if self.method.carries_body() {
            if let Some(entity) = self.entity() {
                let (text, _) = self.encoding.decode_without_bom_handling(&entity);
                buf.push_str(&text);
            }
        }
        buf
    }

    /// Sends this request with the default [`MinreqEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`Transport`](enum.Error.html#variant.Transport) if
    /// sending or receiving fails,
    /// [`EntityTooLarge`](enum.Error.html#variant.EntityTooLarge) if the
    /// body can't be buffered, and
    /// [`UnexpectedStatus`](enum.Error.html#variant.UnexpectedStatus)
    /// for a status other than 200 unless
    /// [`with_force_ok(false)`](#method.with_force_ok) was set.
    pub fn execute(self) -> Result<Response, Error> {
        self.execute_with(&MinreqEngine)
    }

    /// Switches the method to GET and sends the request.
    ///
    /// # Errors
    ///
    /// See [`execute`](#method.execute).
    pub fn execute_get(self) -> Result<Response, Error> {
        self.with_method(Method::Get).execute()
    }

    /// Switches the method to POST and sends the request.
    ///
    /// # Errors
    ///
    /// See [`execute`](#method.execute).
    pub fn execute_post(self) -> Result<Response, Error> {
        self.with_method(Method::Post).execute()
    }

    /// Sends this request with the given engine.
    ///
    /// # Errors
    ///
    /// See [`execute`](#method.execute).
    pub fn execute_with<E: HttpEngine + ?Sized>(self, engine: &E) -> Result<Response, Error> {
        let started = Instant::now();
        let wire = self.to_wire_request();
        log::trace!("Sending {} {}.", wire.method, wire.url);

        let reply = engine.send(&wire, &self.config, self.cookie_jar.as_ref())?;
        let response = Response::create(reply, self.cookie_jar.as_ref(), started)?;
        log::debug!(
            "{} {} -> {} in {} ms.",
            wire.method,
            wire.url,
            response.status_code,
            response.elapsed_millis()
        );

        if self.force_ok && !response.is_ok() {
            return Err(Error::UnexpectedStatus(Box::new(response)));
        }
        Ok(response)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Request{{uri='{}', encoding={}, method='{}', config={}}}",
            self.uri,
            self.encoding.name(),
            self.method,
            self.config
        )
    }
}

fn flat_pairs<'a, S: AsRef<str>>(
    what: &str,
    list: &'a [S],
) -> Result<Vec<(&'a str, &'a str)>, Error> {
    if list.len() % 2 != 0 {
        let items: Vec<&str> = list.iter().map(AsRef::as_ref).collect();
        return Err(Error::InvalidArgument(format!(
            "error {}. {:?}",
            what, items
        )));
    }
    Ok(list
        .chunks(2)
        .map(|pair| (pair[0].as_ref(), pair[1].as_ref()))
        .collect())
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Get](enum.Method.html).
pub fn get<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Get, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Head](enum.Method.html).
pub fn head<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Head, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Post](enum.Method.html).
pub fn post<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Post, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Put](enum.Method.html).
pub fn put<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Put, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Delete](enum.Method.html).
pub fn delete<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Delete, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Patch](enum.Method.html).
pub fn patch<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Patch, uri)
}

/// Alias for [Request::new](struct.Request.html#method.new) with `method` set to
/// [Method::Options](enum.Method.html).
pub fn options<T: Into<URL>>(uri: T) -> Request {
    Request::new(Method::Options, uri)
}
