use crate::error::Error;
use std::fmt;

/// An HTTP proxy to tunnel requests through.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Proxy {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Proxy {
    /// Creates a proxy configuration from its parts.
    pub fn new<S: Into<String>>(host: S, port: u16) -> Proxy {
        Proxy {
            host: host.into(),
            port,
        }
    }

    /// Parses a proxy address.
    ///
    /// Supported proxy format is:
    ///
    /// ```plaintext
    /// [http://]host[:port]
    /// ```
    ///
    /// The default port is 8080.
    ///
    /// # Example
    ///
    /// ```
    /// let proxy = ptth::Proxy::parse("localhost:1080").unwrap();
    /// assert_eq!(proxy.port(), 1080);
    /// ```
    pub fn parse<S: AsRef<str>>(proxy: S) -> Result<Proxy, Error> {
        let proxy = proxy.as_ref();
        let bad_proxy = || Error::InvalidProxy(proxy.to_string());
        let authority = match proxy.split_once("://") {
            Some(("http", authority)) => authority,
            Some(_) => return Err(bad_proxy()),
            None => proxy,
        };
        let authority = authority.trim_end_matches('/');

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().map_err(|_| bad_proxy())?),
            None => (authority, 8080),
        };
        if host.is_empty() {
            return Err(bad_proxy());
        }
        Ok(Proxy::new(host, port))
    }

    /// The proxy host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The proxy port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Proxy {
    /// Formats the proxy as `host:port`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::Proxy;

    #[test]
    fn parse_proxy() {
        let proxy = Proxy::parse("localhost:9999").unwrap();
        assert_eq!(proxy.host(), "localhost");
        assert_eq!(proxy.port(), 9999);
    }

    #[test]
    fn parse_regular_proxy_with_protocol() {
        let proxy = Proxy::parse("http://10.0.0.1:1080/").unwrap();
        assert_eq!(proxy, Proxy::new("10.0.0.1", 1080));
        assert_eq!(proxy.to_string(), "10.0.0.1:1080");
    }

    #[test]
    fn parse_default_port() {
        assert_eq!(Proxy::parse("proxy.local").unwrap().port(), 8080);
    }

    #[test]
    fn parse_bad_proxy() {
        assert!(Proxy::parse("socks5://localhost:1080").is_err());
        assert!(Proxy::parse("localhost:http").is_err());
        assert!(Proxy::parse(":8080").is_err());
    }
}
