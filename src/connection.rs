//! The boundary to the HTTP engine that actually talks to servers.

use crate::cookie::{read_jar, write_jar, CookieJarHandle};
use crate::{Error, Method, RequestConfig, WireRequest};
use std::io::{self, Read};

/// A response as handed back by an [`HttpEngine`], before its body has
/// been read.
pub struct EngineResponse {
    /// The status code of the response, eg. 404.
    pub status_code: i32,
    /// The reason phrase of the response, eg. "Not Found".
    pub reason_phrase: String,
    /// The response headers, in the order the engine reports them.
    pub headers: Vec<(String, String)>,
    /// The response body.
    pub body: Box<dyn Read>,
    /// The `Content-Length` the server declared, if any.
    pub content_length: Option<u64>,
}

/// Something that can send a [`WireRequest`] over the network.
///
/// Engines are expected to attach the cookies in `cookies` that match
/// the request URL, and to store any `Set-Cookie` headers of the
/// response back into it.
pub trait HttpEngine {
    /// Sends the request and returns the response with its body still
    /// unread.
    ///
    /// # Errors
    ///
    /// Any failure to connect or to receive the response head should be
    /// returned as [`Error::Transport`].
    fn send(
        &self,
        request: &WireRequest,
        config: &RequestConfig,
        cookies: Option<&CookieJarHandle>,
    ) -> Result<EngineResponse, Error>;
}

/// The default engine, backed by [`minreq`].
///
/// The connect and read timeouts are added up and rounded up to whole
/// seconds, since minreq only knows a single deadline per request.
/// Headers are sent through minreq's header map, so a header name added
/// more than once is sent with its last value only.
///
/// Response headers come back through the same kind of map, so only the
/// last `Set-Cookie` header of a response reaches the cookie jar. minreq
/// follows redirects on its own: `Set-Cookie` headers sent along with a
/// redirect are never seen, and the cookies of the final response are
/// stored against the URL that was originally requested.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinreqEngine;

impl HttpEngine for MinreqEngine {
    fn send(
        &self,
        request: &WireRequest,
        config: &RequestConfig,
        cookies: Option<&CookieJarHandle>,
    ) -> Result<EngineResponse, Error> {
        let method = minreq::Method::Custom(request.method.to_string());
        let mut outgoing = minreq::Request::new(method, request.url.as_str());
        for (name, value) in &request.headers {
            outgoing = outgoing.with_header(name.as_str(), value.as_str());
        }
        if let Some(jar) = cookies {
            if let Some(cookie_header) = read_jar(jar).request_header(&request.url) {
                outgoing = outgoing.with_header("Cookie", cookie_header);
            }
        }
        if let Some(entity) = &request.entity {
            outgoing = outgoing.with_body(entity.clone());
        }
        if let Some(timeout) = config.total_timeout() {
            let millis = timeout.as_millis().max(1);
            outgoing = outgoing.with_timeout(millis.div_ceil(1000) as u64);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = minreq::Proxy::new(proxy.to_string()).map_err(Error::transport)?;
            outgoing = outgoing.with_proxy(proxy);
        }

        log::trace!("Handing {} {} to minreq.", request.method, request.url);
        let mut lazy = outgoing.send_lazy().map_err(Error::transport)?;

        let mut headers: Vec<(String, String)> = std::mem::take(&mut lazy.headers)
            .into_iter()
            .collect();
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(jar) = cookies {
            let mut jar = write_jar(jar);
            for (_, value) in headers.iter().filter(|(name, _)| name == "set-cookie") {
                if !jar.store_set_cookie(&request.url, value) {
                    log::debug!("Ignoring malformed Set-Cookie header: {}", value);
                }
            }
        }

        let content_length = headers
            .iter()
            .find(|(name, _)| name == "content-length")
            .and_then(|(_, value)| value.trim().parse::<u64>().ok());
        let status_code = lazy.status_code;
        let reason_phrase = std::mem::take(&mut lazy.reason_phrase);
        let body: Box<dyn Read> = if has_body(&request.method, status_code) {
            Box::new(LazyBody(lazy))
        } else {
            Box::new(io::empty())
        };

        Ok(EngineResponse {
            status_code,
            reason_phrase,
            headers,
            body,
            content_length,
        })
    }
}

fn has_body(method: &Method, status_code: i32) -> bool {
    *method != Method::Head && status_code != 204 && status_code != 304
}

/// Reads a minreq response body byte by byte, stopping at the end of
/// each chunk so a read never waits on bytes the server hasn't
/// announced yet.
struct LazyBody(minreq::ResponseLazy);

impl Read for LazyBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.0.next() {
                Some(Ok((byte, remaining))) => {
                    buf[n] = byte;
                    n += 1;
                    if remaining <= 1 {
                        break;
                    }
                }
                Some(Err(err)) => {
                    return Err(io::Error::new(io::ErrorKind::Other, err.to_string()))
                }
                None => break,
            }
        }
        Ok(n)
    }
}
