use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Predicate polarity of an alert: fire when the price rises to/above the
/// target, or falls to/at-or-below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_lowercase().as_str() {
            "above" => Some(Direction::Above),
            "below" => Some(Direction::Below),
            _ => None,
        }
    }

    /// Both comparisons are inclusive: a price exactly at the target fires.
    pub fn is_met(self, price: f64, target: f64) -> bool {
        match self {
            Direction::Above => price >= target,
            Direction::Below => price <= target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // uid of the owning user, as issued by the identity provider
    pub user_id: String,
    pub symbol: String,
    pub alert_name: String,

    pub direction: Direction,
    pub target_price: f64,

    pub created_at: i64,

    // one-way latch: flipped once by the monitor, never reset
    pub triggered: bool,
    pub triggered_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_fires_at_and_over_target() {
        assert!(Direction::Above.is_met(150.0, 150.0));
        assert!(Direction::Above.is_met(150.01, 150.0));
        assert!(!Direction::Above.is_met(149.99, 150.0));
    }

    #[test]
    fn below_fires_at_and_under_target() {
        assert!(Direction::Below.is_met(150.0, 150.0));
        assert!(Direction::Below.is_met(149.99, 150.0));
        assert!(!Direction::Below.is_met(150.01, 150.0));
    }

    #[test]
    fn parse_accepts_known_directions_case_insensitively() {
        assert_eq!(Direction::parse("above"), Some(Direction::Above));
        assert_eq!(Direction::parse("Below"), Some(Direction::Below));
        assert_eq!(Direction::parse("sideways"), None);
        assert_eq!(Direction::parse(""), None);
    }
}
