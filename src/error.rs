use crate::Response;
use std::{error, fmt, io};

/// Represents an error while building, sending, or reading a request.
#[derive(Debug)]
pub enum Error {
    /// A bulk setter such as
    /// [`with_headers`](struct.Request.html#method.with_headers) got a
    /// name/value list of odd length.
    InvalidArgument(String),
    /// The response declared a `Content-Length` that can't be
    /// buffered in memory on this platform.
    EntityTooLarge(u64),
    /// The response had a status code other than 200 while
    /// [`force_ok`](struct.Request.html#method.with_force_ok) was
    /// enabled. The fully buffered response is kept for diagnostics.
    UnexpectedStatus(Box<Response>),
    /// The HTTP engine failed: connecting, TLS, a timeout, or reading
    /// the response stream. The engine's own error is kept as-is.
    Transport(Box<dyn error::Error + Send + Sync>),
    /// The body could not be decoded with the named character
    /// encoding.
    EncodingError(&'static str),
    /// Ran into an IO problem while writing the body to a file.
    IoError(io::Error),
    /// The proxy address could not be parsed.
    InvalidProxy(String),
    /// Ran into a Serde error.
    #[cfg(feature = "json-using-serde")]
    SerdeJsonError(serde_json::Error),
}

impl Error {
    pub(crate) fn transport<E>(err: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error::Transport(err.into())
    }

    /// Returns the status code of an
    /// [`UnexpectedStatus`](#variant.UnexpectedStatus) error.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Error::UnexpectedStatus(response) => Some(response.status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            EntityTooLarge(size) => write!(
                f,
                "HTTP entity too large to be buffered in memory: {}",
                size
            ),
            UnexpectedStatus(response) => write!(
                f,
                "unexpected status code: {} {}",
                response.status_code, response.reason_phrase
            ),
            Transport(err) => write!(f, "{}", err),
            EncodingError(name) => write!(f, "the body is not valid {}", name),
            IoError(err) => write!(f, "{}", err),
            InvalidProxy(proxy) => write!(f, "could not parse proxy address: {}", proxy),
            #[cfg(feature = "json-using-serde")]
            SerdeJsonError(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use Error::*;
        match self {
            Transport(err) => Some(err.as_ref()),
            IoError(err) => Some(err),
            #[cfg(feature = "json-using-serde")]
            SerdeJsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Error {
        Error::IoError(other)
    }
}
