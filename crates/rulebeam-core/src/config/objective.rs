//! Objective function selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Statistic used to rank rules during the beam search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveFunction {
    /// Smoothed conviction: (c/n)·(n−t)/(c−i+1).
    #[default]
    Conviction,
    /// Leverage-of-evidence with a 1.1 exponent on the intersection.
    Loe,
    /// Phi coefficient of the 2×2 contingency table.
    Correlation,
}

impl ObjectiveFunction {
    pub const ALL: [ObjectiveFunction; 3] = [Self::Conviction, Self::Loe, Self::Correlation];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Conviction => "conviction",
            Self::Loe => "loe",
            Self::Correlation => "correlation",
        }
    }
}

impl fmt::Display for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveFunction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conviction" => Ok(Self::Conviction),
            "loe" => Ok(Self::Loe),
            "correlation" => Ok(Self::Correlation),
            other => Err(ConfigError::UnknownObjective {
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for objective in ObjectiveFunction::ALL {
            assert_eq!(objective.name().parse::<ObjectiveFunction>().unwrap(), objective);
        }
        assert_eq!("  LOE ".parse::<ObjectiveFunction>().unwrap(), ObjectiveFunction::Loe);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("lift".parse::<ObjectiveFunction>().is_err());
    }
}
