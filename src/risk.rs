//! Risk classification derived from a weather snapshot
//!
//! The classification is recomputed on every render and never stored.
//!
//! Rules, first match wins:
//! 1. any official alert -> High
//! 2. condition mentions "thunder" or "storm" -> High
//! 3. wind above 50 km/h, or condition exactly "rain" -> Moderate
//! 4. otherwise -> Low

use crate::data::WeatherSnapshot;

/// Wind speed above which conditions are at least Moderate
pub const MODERATE_WIND_KMH: f64 = 50.0;

/// Overall risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

/// Presentation variant of a status card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Success,
    Warning,
    Danger,
}

/// Result of [`assess`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub variant: Variant,
}

impl RiskAssessment {
    fn new(level: RiskLevel) -> Self {
        let variant = match level {
            RiskLevel::Low => Variant::Success,
            RiskLevel::Moderate => Variant::Warning,
            RiskLevel::High => Variant::Danger,
        };
        Self { level, variant }
    }
}

/// Classifies `snapshot`
pub fn assess(snapshot: &WeatherSnapshot) -> RiskAssessment {
    if !snapshot.alerts.is_empty() {
        return RiskAssessment::new(RiskLevel::High);
    }

    let condition = snapshot.current.condition_text.to_lowercase();
    if condition.contains("thunder") || condition.contains("storm") {
        return RiskAssessment::new(RiskLevel::High);
    }

    if snapshot.current.wind_speed_kmh > MODERATE_WIND_KMH || condition == "rain" {
        return RiskAssessment::new(RiskLevel::Moderate);
    }

    RiskAssessment::new(RiskLevel::Low)
}
