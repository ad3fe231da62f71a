use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Distance from the field center to each goal line along `y`.
pub const GOAL_LINE_Y: f64 = 5120.0;

/// The two sides of a match. Blue defends the `-y` goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    Blue,
    Orange,
}

impl Team {
    /// Sign of the `y` coordinate of the goal this team defends.
    pub fn own_goal_sign(&self) -> f64 {
        match self {
            Team::Blue => -1.0,
            Team::Orange => 1.0,
        }
    }

    /// Center of the goal this team defends.
    pub fn own_goal(&self) -> Vector3 {
        Vector3::new(0.0, self.own_goal_sign() * GOAL_LINE_Y, 0.0)
    }

    /// Center of the goal this team attacks.
    pub fn opponent_goal(&self) -> Vector3 {
        Vector3::new(0.0, -self.own_goal_sign() * GOAL_LINE_Y, 0.0)
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Blue => write!(f, "blue"),
            Team::Orange => write!(f, "orange"),
        }
    }
}

/// Static layout of a boost pad.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostPadInfo {
    pub location: Vector3,
    pub is_full_boost: bool,
}

/// Static field information, available once a match has started.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldInfo {
    pub boost_pads: Vec<BoostPadInfo>,
}

impl FieldInfo {
    /// The six full-size pads of the standard arena.
    pub fn standard_full_boosts() -> Self {
        let locations = [
            (-3072.0, -4096.0),
            (3072.0, -4096.0),
            (-3584.0, 0.0),
            (3584.0, 0.0),
            (-3072.0, 4096.0),
            (3072.0, 4096.0),
        ];
        Self {
            boost_pads: locations
                .iter()
                .map(|&(x, y)| BoostPadInfo {
                    location: Vector3::new(x, y, 73.0),
                    is_full_boost: true,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goals_are_opposite() {
        assert_eq!(Team::Blue.own_goal(), Vector3::new(0.0, -5120.0, 0.0));
        assert_eq!(Team::Blue.opponent_goal(), Team::Orange.own_goal());
        assert_eq!(Team::Orange.opponent(), Team::Blue);
    }

    #[test]
    fn test_team_serde() {
        let team: Team = serde_json::from_str("\"orange\"").unwrap();
        assert_eq!(team, Team::Orange);
    }
}
