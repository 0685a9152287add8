//! Validated identity of a WiZ light on the local network.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::Ipv4Addr;

use crate::error::HandleError;

/// Number of hex digits in a device MAC.
const MAC_LEN: usize = 12;

/// A light's identity: its MAC plus the address it was last seen at.
///
/// Two handles are equal when their MACs match; the IP is transport
/// detail and may change between power cycles. Construction validates
/// the MAC, so every handle in circulation holds 12 lowercase hex
/// digits.
#[derive(Debug, Clone)]
pub struct WizHandle {
    mac: String,
    ip: Ipv4Addr,
}

impl WizHandle {
    /// Build a handle from a MAC string and the device address.
    ///
    /// The MAC must be exactly 12 hex digits in either case and is
    /// stored lowercase, so `"F0189809091A"` and `"f0189809091a"` name
    /// the same device.
    pub fn new(mac: &str, ip: Ipv4Addr) -> Result<Self, HandleError> {
        if mac.len() != MAC_LEN {
            return Err(HandleError::MacLength(mac.len()));
        }
        if let Some(bad) = mac.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HandleError::MacDigit(bad));
        }

        Ok(Self {
            mac: mac.to_ascii_lowercase(),
            ip,
        })
    }

    /// The MAC as 12 lowercase hex digits.
    pub fn mac(&self) -> &str {
        &self.mac
    }

    /// The address the device was last seen at.
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }
}

impl PartialEq for WizHandle {
    fn eq(&self, other: &Self) -> bool {
        self.mac == other.mac
    }
}

impl Eq for WizHandle {}

impl Hash for WizHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mac.hash(state);
    }
}

impl fmt::Display for WizHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.mac, self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 0, last)
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            WizHandle::new("abc", ip(10)),
            Err(HandleError::MacLength(3))
        ));
        assert!(matches!(
            WizHandle::new("f0189809091ad", ip(10)),
            Err(HandleError::MacLength(13))
        ));
        assert!(matches!(
            WizHandle::new("", ip(10)),
            Err(HandleError::MacLength(0))
        ));
    }

    #[test]
    fn test_rejects_non_hex_digit() {
        assert!(matches!(
            WizHandle::new("g0189809091a", ip(10)),
            Err(HandleError::MacDigit('g'))
        ));
        assert!(matches!(
            WizHandle::new("f018980909 a", ip(10)),
            Err(HandleError::MacDigit(' '))
        ));
    }

    #[test]
    fn test_normalizes_case() {
        let upper = WizHandle::new("F0189809091A", ip(10)).unwrap();
        let lower = WizHandle::new("f0189809091a", ip(10)).unwrap();

        assert_eq!(upper.mac(), "f0189809091a");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_equality_ignores_ip() {
        let first = WizHandle::new("a8bb5006033d", ip(10)).unwrap();
        let moved = WizHandle::new("a8bb5006033d", ip(99)).unwrap();
        assert_eq!(first, moved);

        let mut seen = HashSet::new();
        seen.insert(first);
        seen.insert(moved);
        assert_eq!(seen.len(), 1);
    }
}
