use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

static LOCAL_SITE_ADDRESS: LazyLock<String> = LazyLock::new(|| {
    let addresses = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces
            .into_iter()
            .filter(|interface| !interface.is_loopback())
            .map(|interface| interface.ip()),
        Err(err) => {
            log::debug!("Could not list network interfaces: {}", err);
            return UNKNOWN.to_string();
        }
    };
    join_site_addresses(addresses)
});

const UNKNOWN: &str = "unknown";

/// The user agent every new request starts with.
pub(crate) static DEFAULT_USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "ptth by shijiebang.com (imxylz@gmail.com, {})",
        local_site_address()
    )
});

/// A desktop Chrome user agent, for servers that only talk to
/// browsers.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/29.0.1547.62 Safari/537.36";

/// Returns every private (RFC 1918) IPv4 address of this host's
/// non-loopback interfaces, joined with `-`, or `"unknown"` if there
/// are none or the interfaces can't be listed.
///
/// Interfaces that are down are not filtered out, as the platform
/// interface listing doesn't report link status. Only loopback
/// interfaces are skipped.
///
/// Computed once per process.
pub fn local_site_address() -> &'static str {
    &LOCAL_SITE_ADDRESS
}

fn join_site_addresses<I: IntoIterator<Item = IpAddr>>(addresses: I) -> String {
    let site_local: Vec<String> = addresses
        .into_iter()
        .filter_map(|address| match address {
            IpAddr::V4(v4) if is_site_local(v4) => Some(v4.to_string()),
            _ => None,
        })
        .collect();
    if site_local.is_empty() {
        UNKNOWN.to_string()
    } else {
        site_local.join("-")
    }
}

// 10.0.0.0/8, 172.16.0.0/12 and 192.168.0.0/16
fn is_site_local(address: Ipv4Addr) -> bool {
    address.is_private()
}

#[cfg(test)]
mod tests {
    use super::{join_site_addresses, local_site_address, DEFAULT_USER_AGENT};
    use std::net::IpAddr;

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|ip| ip.parse().unwrap()).collect()
    }

    #[test]
    fn only_private_ipv4() {
        let joined = join_site_addresses(ips(&[
            "10.1.2.3",
            "8.8.8.8",
            "172.16.0.9",
            "172.32.0.1",
            "192.168.1.20",
            "fe80::1",
            "fd00::1",
        ]));
        assert_eq!(joined, "10.1.2.3-172.16.0.9-192.168.1.20");
    }

    #[test]
    fn nothing_found_is_unknown() {
        assert_eq!(join_site_addresses(ips(&["203.0.113.7", "::1"])), "unknown");
        assert_eq!(join_site_addresses(Vec::new()), "unknown");
    }

    #[test]
    fn computed_once() {
        let first = local_site_address();
        assert!(std::ptr::eq(first, local_site_address()));
        assert!(!first.is_empty());
        assert!(DEFAULT_USER_AGENT.ends_with(&format!("{})", first)));
    }
}
