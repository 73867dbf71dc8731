//! Health reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Whether the service can serve requests.
    pub ok: bool,
    /// Whether the store answered.
    pub store_reachable: bool,
    /// Human-readable explanation.
    pub detail: String,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// A passing report.
    #[must_use]
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            store_reachable: true,
            detail: detail.into(),
            checked_at: Utc::now(),
        }
    }

    /// A failing report: the store did not answer.
    #[must_use]
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            store_reachable: false,
            detail: detail.into(),
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy() {
        let report = HealthReport::healthy("store answered");
        assert!(report.ok);
        assert!(report.store_reachable);
        assert_eq!(report.detail, "store answered");
    }

    #[test]
    fn test_unreachable() {
        let report = HealthReport::unreachable("connection refused");
        assert!(!report.ok);
        assert!(!report.store_reachable);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(HealthReport::healthy("fine")).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["store_reachable"], true);
        assert!(json["checked_at"].is_string());
    }
}
