use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// Longest address-literal body we will look at.
const LITERAL_MAX: usize = 255;

/// Recognize a bracketed numeric host literal of the forms `[a.b.c.d]` and
/// `[IPv6:...]`, returning its socket address (port 0) without consulting any
/// resolver. Anything that is not exactly a literal, including a missing
/// closing bracket, an empty body or an oversized body, returns `None` and
/// the caller falls back to a regular DNS query on the original string.
pub fn parse_domain_literal(domain: &str) -> Option<SocketAddr> {
    let rest = domain.strip_prefix('[')?;
    let (rest, v6) = match strip_ipv6_prefix(rest) {
        Some(tail) => (tail, true),
        None => (rest, false),
    };
    if rest.is_empty() || rest.len() >= LITERAL_MAX {
        return None;
    }
    let body = rest.strip_suffix(']')?;
    if body.is_empty() {
        return None;
    }
    let addr = if v6 {
        IpAddr::V6(Ipv6Addr::from_str(body).ok()?)
    } else {
        IpAddr::V4(Ipv4Addr::from_str(body).ok()?)
    };
    Some(SocketAddr::new(addr, 0))
}

/// Normalize a possibly-bracketed host for an address lookup: strip a
/// leading `[IPv6:` or `[` and cut at the first `]`. Unbracketed names pass
/// through untouched.
pub fn strip_literal_brackets(host: &str) -> &str {
    let Some(rest) = host.strip_prefix('[') else {
        return host;
    };
    let rest = strip_ipv6_prefix(rest).unwrap_or(rest);
    match rest.find(']') {
        Some(at) => &rest[..at],
        None => rest,
    }
}

fn strip_ipv6_prefix(s: &str) -> Option<&str> {
    match s.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("IPv6:") => s.get(5..),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_literal() {
        let addr = parse_domain_literal("[192.0.2.5]").expect("should parse");
        assert_eq!(addr, "192.0.2.5:0".parse().unwrap());
    }

    #[test]
    fn test_ipv6_literal_prefix_is_case_insensitive() {
        for input in ["[IPv6:::1]", "[ipv6:::1]", "[IPV6:::1]"] {
            let addr = parse_domain_literal(input).expect("should parse");
            assert_eq!(addr, "[::1]:0".parse().unwrap());
        }
    }

    #[test]
    fn test_bare_ipv6_is_not_a_literal() {
        // without the IPv6: prefix the body is read as a dotted quad
        assert_eq!(parse_domain_literal("[::1]"), None);
    }

    #[test]
    fn test_rejects() {
        assert_eq!(parse_domain_literal("example.com"), None);
        assert_eq!(parse_domain_literal("[192.0.2.5"), None);
        assert_eq!(parse_domain_literal("[]"), None);
        assert_eq!(parse_domain_literal("[IPv6:]"), None);
        assert_eq!(parse_domain_literal("[192.0.2.5]x"), None);
        assert_eq!(parse_domain_literal("[hello.world]"), None);
        let oversized = format!("[{}]", "1".repeat(300));
        assert_eq!(parse_domain_literal(&oversized), None);
    }

    #[test]
    fn test_strip_literal_brackets() {
        assert_eq!(strip_literal_brackets("example.com"), "example.com");
        assert_eq!(strip_literal_brackets("[192.0.2.5]"), "192.0.2.5");
        assert_eq!(strip_literal_brackets("[IPv6:2001:db8::1]"), "2001:db8::1");
        assert_eq!(strip_literal_brackets("[ipv6:2001:db8::1]"), "2001:db8::1");
        // a missing closing bracket still yields the body
        assert_eq!(strip_literal_brackets("[192.0.2.5"), "192.0.2.5");
    }
}
