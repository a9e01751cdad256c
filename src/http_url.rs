use crate::NameValuePair;
use encoding_rs::Encoding;
use std::borrow::Borrow;

/// Appends `params` to `uri` as a query string.
///
/// Names and values are first encoded to bytes with `encoding`, then
/// percent-encoded following the `application/x-www-form-urlencoded`
/// rules (spaces become `+`). Pairs keep their order, duplicate names
/// included. The query string is joined with `?`, or with `&` if `uri`
/// already contains a `?`.
///
/// If `params` is empty, `uri` is returned unchanged.
///
/// # Example
///
/// ```
/// use ptth::{build_url, NameValuePair};
///
/// let params = [NameValuePair::new("q", "rust lang"), NameValuePair::new("page", "2")];
/// let url = build_url("http://example.com/search", encoding_rs::UTF_8, &params);
/// assert_eq!(url, "http://example.com/search?q=rust+lang&page=2");
/// ```
pub fn build_url<P: Borrow<NameValuePair>>(
    uri: &str,
    encoding: &'static Encoding,
    params: &[P],
) -> String {
    if params.is_empty() {
        return uri.to_string();
    }
    let query = encode_pairs(encoding, params);
    let mut url = String::with_capacity(uri.len() + 1 + query.len());
    url.push_str(uri);
    url.push(if uri.contains('?') { '&' } else { '?' });
    url.push_str(&query);
    url
}

/// Like [`build_url`], for map-like input. Pairs are taken in the
/// iteration order of `params`.
pub fn build_url_from_map<I, K, V>(uri: &str, encoding: &'static Encoding, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let params: Vec<NameValuePair> = params.into_iter().map(NameValuePair::from).collect();
    build_url(uri, encoding, &params)
}

/// Serializes `params` as `name=value` pairs joined by `&`.
pub(crate) fn encode_pairs<P: Borrow<NameValuePair>>(
    encoding: &'static Encoding,
    params: &[P],
) -> String {
    let mut query = String::new();
    for (i, pair) in params.iter().enumerate() {
        let pair = pair.borrow();
        if i > 0 {
            query.push('&');
        }
        push_encoded(&mut query, encoding, &pair.name);
        query.push('=');
        push_encoded(&mut query, encoding, &pair.value);
    }
    query
}

fn push_encoded(dst: &mut String, encoding: &'static Encoding, value: &str) {
    let (bytes, _, _) = encoding.encode(value);
    dst.extend(form_urlencoded::byte_serialize(&bytes));
}

/// The parts of an absolute `http(s)://` URL that cookie matching
/// cares about.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct UrlTarget {
    pub(crate) https: bool,
    pub(crate) host: String,
    pub(crate) path: String,
}

impl UrlTarget {
    /// Splits `url` into scheme, host and path. The port, query and
    /// fragment are dropped. Returns `None` for anything that isn't
    /// `http://` or `https://`.
    pub(crate) fn parse(url: &str) -> Option<UrlTarget> {
        enum UrlParseStatus {
            Host,
            Port,
            Path,
        }

        let (rest, https) = if let Some(rest) = strip_prefix_ignore_case(url, "http://") {
            (rest, false)
        } else if let Some(rest) = strip_prefix_ignore_case(url, "https://") {
            (rest, true)
        } else {
            return None;
        };

        let mut host = String::new();
        let mut path = String::new();
        let mut status = UrlParseStatus::Host;
        for c in rest.chars() {
            match status {
                UrlParseStatus::Host | UrlParseStatus::Port if c == '/' => {
                    status = UrlParseStatus::Path;
                    path.push(c);
                }
                // Tolerate typos like: www.example.com?some=params
                UrlParseStatus::Host | UrlParseStatus::Port if c == '?' || c == '#' => break,
                UrlParseStatus::Host if c == ':' => status = UrlParseStatus::Port,
                UrlParseStatus::Host => host.push(c.to_ascii_lowercase()),
                UrlParseStatus::Port => {}
                UrlParseStatus::Path if c == '?' || c == '#' => break,
                UrlParseStatus::Path => path.push(c),
            }
        }
        if host.is_empty() {
            return None;
        }
        if path.is_empty() {
            path.push('/');
        }
        Some(UrlTarget { https, host, path })
    }
}

pub(crate) fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    strip_prefix_ignore_case(value, prefix).is_some()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}
