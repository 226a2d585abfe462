// 1.0: all the primitives live here. ids, positions, prices, money, timestamps.
// each is a newtype so a player id never ends up where an agent id belongs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

// one simulation period (game week). strictly increasing across triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodId(pub u32);

// wire ids are positive decimal integers. "0", "-3", "abc" and "" are rejected.
fn parse_positive(s: &str) -> Option<u64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u64>().ok().filter(|v| *v > 0)
}

impl PlayerId {
    pub fn parse(s: &str) -> Option<Self> {
        parse_positive(s)
            .and_then(|v| u32::try_from(v).ok())
            .map(Self)
    }
}

impl PostId {
    pub fn parse(s: &str) -> Option<Self> {
        parse_positive(s).map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GW{}", self.0)
    }
}

// 1.1: playing position. declaration order is the display/sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GK" => Ok(Position::Goalkeeper),
            "DEF" => Ok(Position::Defender),
            "MID" => Ok(Position::Midfielder),
            "FWD" => Ok(Position::Forward),
            other => Err(format!("unknown position '{other}'")),
        }
    }
}

// 1.2: player price in millions, tenths resolution. always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn as_money(&self) -> Money {
        Money(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.1}M", self.0)
    }
}

// 1.3: money amount. budgets, totals, overages. may go negative in intermediate math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn add(&self, other: Money) -> Self {
        Self(self.0 + other.0)
    }

    pub fn sub(&self, other: Money) -> Self {
        Self(self.0 - other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.1}M", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc.add(m))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc.add(*m))
    }
}

// 1.4: millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn player_id_parsing() {
        assert_eq!(PlayerId::parse("17"), Some(PlayerId(17)));
        assert_eq!(PlayerId::parse(" 3 "), Some(PlayerId(3)));
        assert_eq!(PlayerId::parse("0"), None);
        assert_eq!(PlayerId::parse("-4"), None);
        assert_eq!(PlayerId::parse("abc"), None);
        assert_eq!(PlayerId::parse(""), None);
        assert_eq!(PlayerId::parse("99999999999"), None); // overflows u32
    }

    #[test]
    fn position_codes_round_trip() {
        for pos in Position::ALL {
            assert_eq!(pos.code().parse::<Position>().unwrap(), pos);
        }
        assert!("ST".parse::<Position>().is_err());
        assert_eq!(serde_json::to_string(&Position::Midfielder).unwrap(), "\"MID\"");
    }

    #[test]
    fn position_order_is_gk_first() {
        let mut positions = vec![Position::Forward, Position::Goalkeeper, Position::Midfielder, Position::Defender];
        positions.sort();
        assert_eq!(positions, Position::ALL.to_vec());
    }

    #[test]
    fn price_must_be_positive() {
        assert!(Price::new(dec!(-0.1)).is_none());
        assert!(Price::new(dec!(0)).is_none());
        assert!(Price::new(dec!(0.1)).is_some());
    }

    #[test]
    fn money_sum_and_display() {
        let total: Money = [dec!(4.0), dec!(5.0), dec!(8.5)]
            .iter()
            .map(|d| Money::new(*d))
            .sum();
        assert_eq!(total.value(), dec!(17.5));
        assert_eq!(total.to_string(), "£17.5M");
        assert!(Money::new(dec!(-1)).is_negative());
    }

    #[test]
    fn amounts_go_on_the_wire_as_numbers() {
        assert_eq!(serde_json::to_string(&Money::new(dec!(42.5))).unwrap(), "42.5");
        assert_eq!(serde_json::to_string(&Price::new_unchecked(dec!(8.5))).unwrap(), "8.5");
        let back: Money = serde_json::from_str("7.5").unwrap();
        assert_eq!(back.value(), dec!(7.5));
    }
}
