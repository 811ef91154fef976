//! Parsing of `wg show` output

use std::collections::HashMap;

/// Transfer counters and last handshake for one peer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerTelemetry {
    /// Bytes received from the peer
    pub received: u64,
    /// Bytes sent to the peer
    pub sent: u64,
    /// Unix time of the latest handshake, 0 if none
    pub last_handshake: u64,
}

/// Telemetry for every peer in a dump, keyed by public key
pub type TelemetryMap = HashMap<String, PeerTelemetry>;

/// Fields on a peer line of `wg show <iface> dump`
const PEER_FIELDS: usize = 8;

/// Parse `wg show <iface> dump`
///
/// Peer lines carry: public-key, preshared-key, endpoint, allowed-ips,
/// latest-handshake, transfer-rx, transfer-tx, persistent-keepalive. The
/// interface line has only four fields and is skipped.
pub fn parse_dump(output: &str) -> TelemetryMap {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < PEER_FIELDS {
                return None;
            }

            let telemetry = PeerTelemetry {
                last_handshake: parse_counter(fields[4]),
                received: parse_counter(fields[5]),
                sent: parse_counter(fields[6]),
            };
            Some((fields[0].to_string(), telemetry))
        })
        .collect()
}

/// Server public key from `wg show <iface>`, if present
pub fn parse_public_key(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("public key:")
            .map(|key| key.trim().to_string())
    })
}

fn parse_counter(field: &str) -> u64 {
    field.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=\tHIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=\t51820\toff
xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=\t(none)\t192.0.2.10:51820\t10.8.0.2/32\t1700000000\t2048\t4096\toff
TrMvSoP4jYQlY6RIzBgbssQqY3vxI2Pi+y71lOWWXX0=\tkT3NIm9SMyR8xYlhtEeQ9dF7vM/pT6FoVtI0zIbxH0Q=\t(none)\t10.8.0.3/32\t0\t0\t0\t25
";

    #[test]
    fn test_parse_dump_skips_interface_line() {
        let map = parse_dump(DUMP);
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk="));
    }

    #[test]
    fn test_parse_dump_fields() {
        let map = parse_dump(DUMP);
        let peer = map["xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg="];
        assert_eq!(peer.last_handshake, 1_700_000_000);
        assert_eq!(peer.received, 2048);
        assert_eq!(peer.sent, 4096);

        let idle = map["TrMvSoP4jYQlY6RIzBgbssQqY3vxI2Pi+y71lOWWXX0="];
        assert_eq!(idle, PeerTelemetry::default());
    }

    #[test]
    fn test_parse_dump_bad_numbers_are_zero() {
        let map = parse_dump("key\tpsk\tep\tips\tsoon\tlots\t12\toff\n");
        assert_eq!(
            map["key"],
            PeerTelemetry {
                received: 0,
                sent: 12,
                last_handshake: 0
            }
        );
    }

    #[test]
    fn test_parse_dump_empty() {
        assert!(parse_dump("").is_empty());
    }

    #[test]
    fn test_parse_public_key() {
        let output = "interface: wg0\n  public key: HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=\n  private key: (hidden)\n  listening port: 51820\n";
        assert_eq!(
            parse_public_key(output).as_deref(),
            Some("HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=")
        );
        assert_eq!(parse_public_key("interface: wg0\n"), None);
    }
}
