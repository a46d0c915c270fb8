//! Knock port list parsing.

use tumbler_common::{KnockPlan, TumblerError, TumblerResult};

/// Parses an ordered list like "13,37,30000,3000,1337" into a `KnockPlan`.
/// Whitespace around entries is ignored; order and repeats are kept.
pub fn parse_ports(ports_str: &str) -> TumblerResult<KnockPlan> {
    if ports_str.trim().is_empty() {
        return Err(TumblerError::EmptyPortList);
    }

    let mut ports = Vec::new();
    for part in ports_str.split(',') {
        let part = part.trim();
        let port: i64 = part
            .parse()
            .map_err(|_| TumblerError::InvalidPort(format!("{:?} is not a number", part)))?;
        if !(1..=65535).contains(&port) {
            return Err(TumblerError::InvalidPort(format!(
                "{} out of range (1-65535)",
                port
            )));
        }
        ports.push(port as u16);
    }

    KnockPlan::new(ports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ports_single() {
        let plan = parse_ports("80").unwrap();
        assert_eq!(plan.ports(), &[80]);
        assert!(plan.knock_ports().is_empty());
    }

    #[test]
    fn test_parse_ports_ordered() {
        let plan = parse_ports("13,37,30000,3000,1337").unwrap();
        assert_eq!(plan.ports(), &[13, 37, 30000, 3000, 1337]);
        assert_eq!(plan.guard_port(), 1337);
    }

    #[test]
    fn test_parse_ports_whitespace() {
        let plan = parse_ports(" 22, 80 , 443 ").unwrap();
        assert_eq!(plan.ports(), &[22, 80, 443]);
    }

    #[test]
    fn test_parse_ports_empty() {
        assert!(matches!(parse_ports(""), Err(TumblerError::EmptyPortList)));
        assert!(matches!(parse_ports("   "), Err(TumblerError::EmptyPortList)));
        assert!(matches!(parse_ports(",,"), Err(TumblerError::InvalidPort(_))));
        assert!(matches!(parse_ports("80,"), Err(TumblerError::InvalidPort(_))));
    }

    #[test]
    fn test_parse_ports_invalid() {
        for bad in ["abc", "abc,80", "80,abc", "0", "-1", "65536", "99999", "80-90"] {
            assert!(
                matches!(parse_ports(bad), Err(TumblerError::InvalidPort(_))),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_ports_bounds() {
        assert_eq!(parse_ports("1,65535").unwrap().ports(), &[1, 65535]);
    }
}
