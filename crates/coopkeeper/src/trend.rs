//! Trend types for coopkeeper.
//!
//! A trend is a date-ordered sequence of (date, value) pairs derived
//! from one column of the record table over a recent day window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The calendar date of the observation.
    pub date: NaiveDate,
    /// The derived value for that observation.
    pub value: f64,
}

/// The metric a trend series is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Feed given per observation, in kilograms.
    Feed,
    /// Dead birds per observation as a percentage of the flock.
    Mortality,
    /// Eggs collected per observation (layer flocks).
    EggProduction,
}

impl std::fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feed => write!(f, "feed"),
            Self::Mortality => write!(f, "mortality"),
            Self::EggProduction => write!(f, "egg_production"),
        }
    }
}

impl TrendMetric {
    /// Unit label for display output.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Feed => "kg",
            Self::Mortality => "%",
            Self::EggProduction => "eggs",
        }
    }
}
