//! Client address resolution behind reverse proxies.
//!
//! The TCP peer of a service behind nginx is nginx. The real client is in
//! `X-Forwarded-For` / `X-Real-IP`, but those headers are only worth reading
//! when the peer is a proxy we trust; anyone else can put anything there.

use std::net::IpAddr;

use serde::Deserialize;

use crate::request::Request;

/// Which peers may vouch for the client address via forwarding headers.
///
/// Deserialises from `"none"`, `"all"`, or `{ "list": ["10.0.0.1", …] }`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxies {
    /// Ignore forwarding headers; always use the TCP peer.
    #[default]
    None,
    /// Trust every peer.
    All,
    List(Vec<IpAddr>),
}

impl TrustedProxies {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::List(ips) => ips.contains(&ip),
        }
    }
}

/// Best-effort client address for `req`.
///
/// With a trusted peer, walks `X-Forwarded-For` right to left and returns the
/// first hop that is not itself a trusted proxy, then falls back to
/// `X-Real-IP`. Otherwise, or when the headers hold nothing parseable, the
/// peer address. `None` when the request has no peer at all.
pub fn resolve(req: &Request, trusted: &TrustedProxies) -> Option<IpAddr> {
    let peer = req.remote_addr()?.ip();
    if !trusted.contains(peer) {
        return Some(peer);
    }

    if let Some(ip) = req.header("x-forwarded-for").and_then(|v| from_forwarded_for(v, trusted)) {
        return Some(ip);
    }

    let real_ip = req.header("x-real-ip").and_then(|v| v.trim().parse().ok());
    Some(real_ip.unwrap_or(peer))
}

fn from_forwarded_for(value: &str, trusted: &TrustedProxies) -> Option<IpAddr> {
    let hops: Vec<IpAddr> = value
        .split(',')
        .map(|hop| hop.trim().parse::<IpAddr>())
        .collect::<Result<_, _>>()
        .ok()?;

    hops.iter()
        .rev()
        .find(|ip| !trusted.contains(**ip))
        .or_else(|| hops.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Body;

    fn request(peer: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::get("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Request::from(builder.body(Body::empty()).unwrap())
            .with_remote_addr(format!("{peer}:40000").parse().unwrap())
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn untrusted_peer_ignores_headers() {
        let req = request("203.0.113.9", &[("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(resolve(&req, &TrustedProxies::None), Some(ip("203.0.113.9")));
    }

    #[test]
    fn trusted_peer_uses_first_untrusted_hop_from_the_right() {
        let trusted = TrustedProxies::List(vec![ip("10.0.0.1"), ip("10.0.0.2")]);
        let req = request("10.0.0.1", &[("x-forwarded-for", "198.51.100.4, 192.0.2.8, 10.0.0.2")]);
        assert_eq!(resolve(&req, &trusted), Some(ip("192.0.2.8")));
    }

    #[test]
    fn all_hops_trusted_yields_leftmost() {
        let req = request("10.0.0.1", &[("x-forwarded-for", "192.0.2.8, 10.0.0.5")]);
        assert_eq!(resolve(&req, &TrustedProxies::All), Some(ip("192.0.2.8")));
    }

    #[test]
    fn falls_back_to_real_ip_then_peer() {
        let req = request("10.0.0.1", &[("x-forwarded-for", "garbage"), ("x-real-ip", "192.0.2.44")]);
        assert_eq!(resolve(&req, &TrustedProxies::All), Some(ip("192.0.2.44")));

        let req = request("10.0.0.1", &[]);
        assert_eq!(resolve(&req, &TrustedProxies::All), Some(ip("10.0.0.1")));
    }

    #[test]
    fn no_peer_resolves_to_nothing() {
        let req = Request::from(http::Request::get("/").body(Body::empty()).unwrap());
        assert_eq!(resolve(&req, &TrustedProxies::All), None);
    }

    #[test]
    fn deserialises_from_config() {
        let all: TrustedProxies = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(all, TrustedProxies::All);

        let list: TrustedProxies = serde_json::from_str(r#"{"list":["10.0.0.1"]}"#).unwrap();
        assert_eq!(list, TrustedProxies::List(vec![ip("10.0.0.1")]));
    }
}
