use serde::Serialize;
use std::fmt;

/// Where a piece of data came from. Every event, contract and bundle is tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Platform {
    /// Regulated exchange (Kalshi). Prices arrive in cents.
    Kalshi,
    /// Peer-to-peer market (Polymarket). Prices arrive as 0-1 probabilities.
    Polymarket,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Kalshi, Platform::Polymarket];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Kalshi => write!(f, "Kalshi"),
            Platform::Polymarket => write!(f, "Polymarket"),
        }
    }
}

/// Outcome direction of a binary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

/// Unit tag carried by every contract's prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PriceUnits {
    /// Cents on a 0-100 scale.
    UsdCent,
    /// Anything else the exchange reports. Kept verbatim.
    Other(String),
}

impl PriceUnits {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "usd_cent" => PriceUnits::UsdCent,
            other => PriceUnits::Other(other.to_string()),
        }
    }
}

impl Default for PriceUnits {
    fn default() -> Self {
        PriceUnits::UsdCent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Yes.opposite(), Side::No);
        assert_eq!(Side::No.opposite(), Side::Yes);
    }

    #[test]
    fn test_price_units_from_tag() {
        assert_eq!(PriceUnits::from_tag("usd_cent"), PriceUnits::UsdCent);
        assert_eq!(
            PriceUnits::from_tag("centi_cent"),
            PriceUnits::Other("centi_cent".to_string())
        );
    }
}
