use crate::Proxy;
use std::env;
use std::fmt;
use std::time::Duration;

/// Per-request connection settings handed to the HTTP engine.
///
/// New requests start from [`RequestConfig::from_env`], so the
/// `PTTH_CONNECT_TIMEOUT` and `PTTH_READ_TIMEOUT` environment variables
/// (in milliseconds) act as process-wide defaults:
///
/// ```text,ignore
/// $ PTTH_CONNECT_TIMEOUT=2000 PTTH_READ_TIMEOUT=8000 ./foo
/// ```
///
/// Timeouts set on the request itself always win.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RequestConfig {
    /// How long to wait for the connection to be established.
    pub connect_timeout: Option<Duration>,
    /// How long to wait for the response to arrive.
    pub read_timeout: Option<Duration>,
    /// The HTTP proxy to connect through.
    pub proxy: Option<Proxy>,
}

impl RequestConfig {
    /// Reads the default timeouts from the environment. Unset or
    /// unparsable variables leave the timeout disabled.
    pub fn from_env() -> RequestConfig {
        RequestConfig {
            connect_timeout: parse_millis(env::var("PTTH_CONNECT_TIMEOUT").ok()),
            read_timeout: parse_millis(env::var("PTTH_READ_TIMEOUT").ok()),
            proxy: None,
        }
    }

    /// The deadline for the whole exchange: connect and read timeouts
    /// added up. `None` if neither is set.
    pub fn total_timeout(&self) -> Option<Duration> {
        match (self.connect_timeout, self.read_timeout) {
            (None, None) => None,
            (connect, read) => Some(connect.unwrap_or_default() + read.unwrap_or_default()),
        }
    }
}

impl fmt::Display for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let millis = |timeout: Option<Duration>| timeout.map_or(-1, |t| t.as_millis() as i64);
        write!(
            f,
            "[connectTimeout={}, socketTimeout={}, proxy={}]",
            millis(self.connect_timeout),
            millis(self.read_timeout),
            self.proxy
                .as_ref()
                .map_or_else(|| "null".to_string(), Proxy::to_string),
        )
    }
}

fn parse_millis(value: Option<String>) -> Option<Duration> {
    let millis = value?.trim().parse::<u64>().ok()?;
    Some(Duration::from_millis(millis))
}
