//! Performance tier domain types
//!
//! The four DORA performance levels and the inter-deployment interval each
//! one is allowed. Tiers are plain constants; nothing here performs I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DORA team performance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamLevel {
    Elite,
    High,
    Medium,
    Low,
}

impl TeamLevel {
    /// All levels, best first
    pub const ALL: [TeamLevel; 4] = [
        TeamLevel::Elite,
        TeamLevel::High,
        TeamLevel::Medium,
        TeamLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamLevel::Elite => "Elite",
            TeamLevel::High => "High",
            TeamLevel::Medium => "Medium",
            TeamLevel::Low => "Low",
        }
    }
}

impl fmt::Display for TeamLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a performance level name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown team performance level: {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for TeamLevel {
    type Err = ParseLevelError;

    /// Parses a level name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elite" => Ok(TeamLevel::Elite),
            "high" => Ok(TeamLevel::High),
            "medium" => Ok(TeamLevel::Medium),
            "low" => Ok(TeamLevel::Low),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Allowed number of minutes between two deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployInterval {
    pub lower_bound: u64,
    pub upper_bound: u64,
}

impl DeployInterval {
    /// Width of the interval in minutes, zero when the bounds are inverted
    pub fn span(&self) -> u64 {
        self.upper_bound.saturating_sub(self.lower_bound)
    }
}

/// Descriptive DORA profile shown alongside a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoraProfile {
    pub deployment_frequency: &'static str,
    pub change_lead_time: &'static str,
    pub change_failure_rate: &'static str,
    pub recovery_time: &'static str,
}

/// A performance tier: a level plus its deployment interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceTier {
    pub level: TeamLevel,
    pub interval: DeployInterval,
    pub profile: DoraProfile,
}

impl PerformanceTier {
    /// Between 1 and 12 hours
    pub const fn elite() -> Self {
        Self {
            level: TeamLevel::Elite,
            interval: DeployInterval {
                lower_bound: 60,
                upper_bound: 720,
            },
            profile: DoraProfile {
                deployment_frequency: "On-demand (multiple deploys per day)",
                change_lead_time: "Less than one day",
                change_failure_rate: "5%",
                recovery_time: "Less than one hour",
            },
        }
    }

    /// Between 1 day and 1 week
    pub const fn high() -> Self {
        Self {
            level: TeamLevel::High,
            interval: DeployInterval {
                lower_bound: 1440,
                upper_bound: 10080,
            },
            profile: DoraProfile {
                deployment_frequency: "Between once per day and once per week",
                change_lead_time: "Between one day and one week",
                change_failure_rate: "10%",
                recovery_time: "Less than one day",
            },
        }
    }

    /// Between 1 and 4 weeks
    pub const fn medium() -> Self {
        Self {
            level: TeamLevel::Medium,
            interval: DeployInterval {
                lower_bound: 10080,
                upper_bound: 40320,
            },
            profile: DoraProfile {
                deployment_frequency: "Between once per week and once per month",
                change_lead_time: "Between one week and one month",
                change_failure_rate: "15%",
                recovery_time: "Between one day and one week",
            },
        }
    }

    /// Between 4 and 24 weeks
    pub const fn low() -> Self {
        Self {
            level: TeamLevel::Low,
            interval: DeployInterval {
                lower_bound: 40320,
                upper_bound: 201600,
            },
            profile: DoraProfile {
                deployment_frequency: "Between once per month and once every six months",
                change_lead_time: "Between one month and six months",
                change_failure_rate: "64%",
                recovery_time: "Between one month and six months",
            },
        }
    }

    pub const fn for_level(level: TeamLevel) -> Self {
        match level {
            TeamLevel::Elite => Self::elite(),
            TeamLevel::High => Self::high(),
            TeamLevel::Medium => Self::medium(),
            TeamLevel::Low => Self::low(),
        }
    }

    /// The whole catalog, best first
    pub fn all() -> [PerformanceTier; 4] {
        TeamLevel::ALL.map(Self::for_level)
    }
}
