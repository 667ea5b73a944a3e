//! CIDR block parsing and arithmetic for network checks.

use std::net::IpAddr;
use std::str::FromStr;

/// An IP network in CIDR notation, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: IpAddr,
    prefix_len: u8,
}

impl Cidr {
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    fn max_prefix(&self) -> u8 {
        match self.network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    /// Number of addresses in the block, or `None` if it exceeds `u128`
    /// (only an IPv6 `/0`).
    #[must_use]
    pub fn size(&self) -> Option<u128> {
        1u128.checked_shl(u32::from(self.max_prefix() - self.prefix_len))
    }

    fn bits(&self) -> u128 {
        match self.network {
            IpAddr::V4(a) => u128::from(u32::from(a)),
            IpAddr::V6(a) => u128::from(a),
        }
    }

    fn mask(&self) -> u128 {
        let host_bits = u32::from(self.max_prefix() - self.prefix_len);
        let all = match self.network {
            IpAddr::V4(_) => u128::from(u32::MAX),
            IpAddr::V6(_) => u128::MAX,
        };
        all.checked_shl(host_bits).unwrap_or(0) & all
    }

    /// Whether `other` lies entirely inside this block.
    #[must_use]
    pub fn contains(&self, other: &Cidr) -> bool {
        self.network.is_ipv4() == other.network.is_ipv4()
            && other.prefix_len >= self.prefix_len
            && (other.bits() & self.mask()) == self.bits()
    }

    /// Whether the two blocks share any address.
    #[must_use]
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Reason a CIDR string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CIDR address: {0}")]
pub struct CidrParseError(pub String);

impl FromStr for Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CidrParseError(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(err)?;
        let addr: IpAddr = addr.parse().map_err(|_| err())?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let prefix_len: u8 = prefix.parse().map_err(|_| err())?;
        let mut cidr = Cidr {
            network: addr,
            prefix_len,
        };
        if prefix_len > cidr.max_prefix() {
            return Err(err());
        }
        let masked = cidr.bits() & cidr.mask();
        cidr.network = match addr {
            #[allow(clippy::cast_possible_truncation)] // masked fits in 32 bits for IPv4
            IpAddr::V4(_) => IpAddr::V4((masked as u32).into()),
            IpAddr::V6(_) => IpAddr::V6(masked.into()),
        };
        Ok(cidr)
    }
}
