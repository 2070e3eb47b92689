// ── Source prefix ──
//
// IPv4 network used to filter flows by source address. Host bits are
// masked off (`10.1.2.3/8` becomes `10.0.0.0/8`) and a bare address is
// a /32. `0.0.0.0/0` is the "match everything" default and is never
// sent to the controller.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// An IPv4 network in CIDR form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePrefix {
    network: Ipv4Addr,
    len: u8,
}

impl SourcePrefix {
    /// The unfiltered default, `0.0.0.0/0`.
    pub const ANY: Self = Self {
        network: Ipv4Addr::UNSPECIFIED,
        len: 0,
    };

    /// Build a prefix, masking host bits. Fails if `len > 32`.
    pub fn new(addr: Ipv4Addr, len: u8) -> Result<Self, CoreError> {
        if len > 32 {
            return Err(CoreError::InvalidPrefix {
                input: format!("{addr}/{len}"),
                reason: "prefix length must be between 0 and 32".into(),
            });
        }
        let mask = u32::MAX.checked_shl(32 - u32::from(len)).unwrap_or(0);
        Ok(Self {
            network: Ipv4Addr::from(u32::from(addr) & mask),
            len,
        })
    }

    pub fn network(self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(self) -> u8 {
        self.len
    }

    /// `true` for `0.0.0.0/0`, which filters nothing.
    pub fn is_any(self) -> bool {
        self.len == 0
    }

    /// `None` when the prefix filters nothing, so callers can skip the clause.
    pub fn as_filter(self) -> Option<Self> {
        (!self.is_any()).then_some(self)
    }
}

impl Default for SourcePrefix {
    fn default() -> Self {
        Self::ANY
    }
}

impl FromStr for SourcePrefix {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidPrefix {
            input: s.into(),
            reason: reason.into(),
        };

        let trimmed = s.trim();
        let (addr, len) = match trimmed.split_once('/') {
            Some((addr, len)) => {
                let len: u8 = len
                    .parse()
                    .map_err(|_| invalid("prefix length must be a number between 0 and 32"))?;
                (addr, len)
            }
            None => (trimmed, 32),
        };

        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| invalid("must take the form of 1.1.1.0/24 or 2.2.2.2/32"))?;

        if len > 32 {
            return Err(invalid("prefix length must be between 0 and 32"));
        }

        Self::new(addr, len)
    }
}

impl fmt::Display for SourcePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}

impl Serialize for SourcePrefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
