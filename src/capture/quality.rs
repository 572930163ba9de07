use serde::{Deserialize, Serialize};

/// Lossy encoding quality for captured stills
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    /// Encoder quality level (0-100)
    pub fn level(&self) -> u8 {
        match self {
            Quality::Low => 30,
            Quality::Medium => 50,
            Quality::High => 85,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
        }
    }

    /// Parse from string, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Quality::Low),
            "medium" => Some(Quality::Medium),
            "high" => Some(Quality::High),
            _ => None,
        }
    }

    /// Cycle Low -> Medium -> High -> Low
    pub fn next(&self) -> Self {
        match self {
            Quality::Low => Quality::Medium,
            Quality::Medium => Quality::High,
            Quality::High => Quality::Low,
        }
    }
}
