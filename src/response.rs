use crate::connection::EngineResponse;
use crate::cookie::{read_jar, Cookie, CookieJar, CookieJarHandle};
use crate::Error;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

const MIN_BUFFER_CAPACITY: usize = 4096;
// Declared lengths are a hint only, don't trust them with more than this
// up front.
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

/// An HTTP response, with its body buffered in memory.
///
/// Returned by [`Request::execute`](struct.Request.html#method.execute).
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), ptth::Error> {
/// let response = ptth::get("http://example.com").execute()?;
/// println!("{} ms: {}", response.elapsed_millis(), response.as_string()?);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Response {
    /// The status code of the response, eg. 404.
    pub status_code: i32,
    /// The reason phrase of the response, eg. "Not Found".
    pub reason_phrase: String,
    headers: Vec<(String, String)>,
    cookies: Option<CookieJar>,
    elapsed: Duration,
    encoding: &'static Encoding,
    decoded: Mutex<Option<(&'static Encoding, Arc<str>)>>,
    body: Vec<u8>,
}

impl Response {
    pub(crate) fn create(
        reply: EngineResponse,
        cookies: Option<&CookieJarHandle>,
        started: Instant,
    ) -> Result<Response, Error> {
        let EngineResponse {
            status_code,
            reason_phrase,
            headers,
            body,
            content_length,
        } = reply;
        let body = buffer_body(body, content_length)?;
        // Copy the jar so later requests sharing it don't change what
        // this response reports.
        let cookies = cookies.map(|jar| read_jar(jar).clone());

        Ok(Response {
            status_code,
            reason_phrase,
            headers,
            cookies,
            elapsed: started.elapsed(),
            encoding: UTF_8,
            decoded: Mutex::new(None),
            body,
        })
    }

    /// Sets the encoding [`as_string`](#method.as_string) decodes
    /// with. UTF-8 by default.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Response {
        self.encoding = encoding;
        self
    }

    /// Returns true if the status code is 200.
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// The response headers. Names are as reported by the engine, the
    /// default engine lowercases them.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header called `name`, compared
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&(String, String)> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Returns the value of the first header called `name`.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header(name).map(|(_, value)| value.as_str())
    }

    /// The time from starting the request until the body was buffered.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// [`elapsed`](#method.elapsed) in whole milliseconds.
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// The cookies of the request's jar as they were when the response
    /// arrived, or `None` if the request had no jar.
    pub fn cookies(&self) -> Option<&CookieJar> {
        self.cookies.as_ref()
    }

    /// Returns the cookie called `name`, compared case-insensitively.
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.as_ref()?.get(name)
    }

    /// Returns the value of the cookie called `name`.
    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.cookie(name).map(|cookie| cookie.value.as_str())
    }

    /// Returns a reference to the contained bytes of the body.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Turns the `Response` into the bytes of its body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Returns the body decoded with the response's encoding.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`](enum.Error.html#variant.EncodingError)
    /// if the body isn't valid in that encoding.
    pub fn as_string(&self) -> Result<Arc<str>, Error> {
        self.as_string_with(self.encoding)
    }

    /// Returns the body decoded with `encoding`. The result is cached
    /// until a different encoding is asked for.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`](enum.Error.html#variant.EncodingError)
    /// if the body isn't valid in `encoding`.
    pub fn as_string_with(&self, encoding: &'static Encoding) -> Result<Arc<str>, Error> {
        let mut decoded = self.decoded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_encoding, text)) = decoded.as_ref() {
            if *cached_encoding == encoding {
                return Ok(Arc::clone(text));
            }
        }
        let text: Arc<str> = encoding
            .decode_without_bom_handling_and_without_replacement(&self.body)
            .ok_or(Error::EncodingError(encoding.name()))?
            .into();
        *decoded = Some((encoding, Arc::clone(&text)));
        Ok(text)
    }

    /// Passes the decoded body to `decode`, eg. a JSON parser.
    ///
    /// # Errors
    ///
    /// See [`as_string`](#method.as_string).
    pub fn as_json<T, F: FnOnce(&str) -> T>(&self, decode: F) -> Result<T, Error> {
        Ok(decode(&*self.as_string()?))
    }

    /// Converts JSON body to a `struct` using Serde.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`SerdeJsonError`](enum.Error.html#variant.SerdeJsonError) if
    /// Serde runs into a problem, or
    /// [`EncodingError`](enum.Error.html#variant.EncodingError) if the
    /// body can't be decoded.
    #[cfg(feature = "json-using-serde")]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, Error> {
        let text = self.as_string()?;
        serde_json::from_str(&text).map_err(Error::SerdeJsonError)
    }

    /// Writes the body to `path` and returns the path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](enum.Error.html#variant.IoError) if the file
    /// can't be written.
    pub fn as_file<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, Error> {
        let path = path.as_ref();
        fs::write(path, &self.body)?;
        Ok(path.to_path_buf())
    }

    /// Writes the body to a new, randomly named file in the system's
    /// temporary directory and returns its path. The file is not
    /// deleted afterwards.
    ///
    /// # Errors
    ///
    /// See [`as_file`](#method.as_file).
    pub fn as_temp_file(&self) -> Result<PathBuf, Error> {
        let name = uuid::Uuid::new_v4().to_string();
        self.as_file(std::env::temp_dir().join(name))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Response{{statusCode={}, timecost={}}}",
            self.status_code,
            self.elapsed_millis()
        )
    }
}

/// Reads `body` to the end. `declared` only sizes the initial buffer:
/// absent, zero or wrong lengths still read the whole stream.
pub(crate) fn buffer_body<R: Read>(mut body: R, declared: Option<u64>) -> Result<Vec<u8>, Error> {
    let declared = declared.unwrap_or(0);
    if declared > isize::MAX as u64 {
        return Err(Error::EntityTooLarge(declared));
    }
    let capacity = (declared as usize).clamp(MIN_BUFFER_CAPACITY, MAX_PREALLOCATION);
    let mut buffer = Vec::with_capacity(capacity);
    body.read_to_end(&mut buffer).map_err(Error::transport)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{buffer_body, Response};
    use crate::connection::EngineResponse;
    use crate::cookie::{Cookie, CookieJar};
    use crate::Error;
    use encoding_rs::{GBK, UTF_8, WINDOWS_1252};
    use std::io::{self, Cursor, Read};
    use std::time::Instant;

    fn response(status_code: i32, body: &[u8]) -> Response {
        let reply = EngineResponse {
            status_code,
            reason_phrase: "OK".to_string(),
            headers: vec![
                ("content-type".to_string(), "text/plain".to_string()),
                ("x-dup".to_string(), "first".to_string()),
                ("X-Dup".to_string(), "second".to_string()),
            ],
            body: Box::new(Cursor::new(body.to_vec())),
            content_length: Some(body.len() as u64),
        };
        Response::create(reply, None, Instant::now()).unwrap()
    }

    /// Hands out at most three bytes per read, like a slow chunked
    /// stream.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(3);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn unknown_length_reads_to_end() {
        let data = vec![7u8; 10_000];
        let buffer = buffer_body(Trickle(Cursor::new(data.clone())), None).unwrap();
        assert_eq!(buffer, data);
        assert!(buffer.capacity() >= 4096);

        let buffer = buffer_body(Trickle(Cursor::new(b"abc".to_vec())), None).unwrap();
        assert_eq!(buffer, b"abc");
        assert!(buffer.capacity() >= 4096);
    }

    #[test]
    fn wrong_length_reads_to_end() {
        let buffer = buffer_body(Cursor::new(b"hello world".to_vec()), Some(5)).unwrap();
        assert_eq!(buffer, b"hello world");
        let buffer = buffer_body(Cursor::new(b"hi".to_vec()), Some(100_000)).unwrap();
        assert_eq!(buffer, b"hi");
    }

    #[test]
    fn massive_declared_length_fails_fast() {
        let err = buffer_body(io::empty(), Some(u64::MAX)).unwrap_err();
        assert!(matches!(err, Error::EntityTooLarge(u64::MAX)));
    }

    #[test]
    fn stream_errors_are_transport_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        assert!(matches!(
            buffer_body(Broken, None),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn decoding_follows_the_asked_encoding() {
        // "é" in UTF-8, which reads as two characters in windows-1252.
        let resp = response(200, &[0xC3, 0xA9]);
        assert_eq!(&*resp.as_string_with(UTF_8).unwrap(), "é");
        assert_eq!(&*resp.as_string_with(WINDOWS_1252).unwrap(), "Ã©");
        assert_eq!(&*resp.as_string().unwrap(), "é");
    }

    #[test]
    fn response_encoding() {
        let resp = response(200, &[0xB1, 0xB1, 0xBE, 0xA9]).with_encoding(GBK);
        assert_eq!(&*resp.as_string().unwrap(), "北京");
        assert!(matches!(
            resp.as_string_with(UTF_8),
            Err(Error::EncodingError("UTF-8"))
        ));
    }

    #[test]
    fn json_hook() {
        let resp = response(200, b"[1,2,3]");
        let count = resp.as_json(|text| text.matches(',').count()).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn header_lookup() {
        let resp = response(404, b"");
        assert!(!resp.is_ok());
        assert_eq!(resp.header_value("X-DUP"), Some("first"));
        assert_eq!(resp.header_value("Content-Type"), Some("text/plain"));
        assert_eq!(resp.header_value("missing"), None);
    }

    #[test]
    fn cookie_snapshot_is_detached() {
        let jar = CookieJar::shared();
        jar.write().unwrap().add(Cookie::new("sid", "one"));
        let reply = EngineResponse {
            status_code: 200,
            reason_phrase: "OK".to_string(),
            headers: Vec::new(),
            body: Box::new(io::empty()),
            content_length: None,
        };
        let resp = Response::create(reply, Some(&jar), Instant::now()).unwrap();
        jar.write().unwrap().add(Cookie::new("sid", "two"));
        assert_eq!(resp.cookie_value("SID"), Some("one"));
        assert_eq!(resp.cookies().unwrap().len(), 1);
    }

    #[test]
    fn display() {
        let resp = response(404, b"");
        let text = resp.to_string();
        assert!(text.starts_with("Response{statusCode=404, timecost="));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn body_to_files() {
        let resp = response(200, b"saved");
        let path = resp.as_temp_file().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"saved");
        std::fs::remove_file(&path).unwrap();
    }
}
