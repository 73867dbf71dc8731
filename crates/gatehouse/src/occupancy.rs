//! Parking occupancy derived from the live visitor set.
//!
//! Every active visitor holds one spot; visitors who have left hold none.

use serde::Serialize;

use crate::visitor::Visitor;

/// How much room is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No free spots.
    Full,
    /// Free spots below the low-availability threshold.
    Low,
    /// Plenty of room.
    Open,
}

/// A snapshot of parking usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occupancy {
    /// Live visitor records.
    pub total_visitors: usize,
    /// Visitors currently parked.
    pub active: usize,
    /// Visitors who have left.
    pub left: usize,
    /// Spots in the facility.
    pub total_spots: u32,
    /// Spots not taken by an active visitor.
    pub available_spots: u32,
    /// Share of spots taken, 0.0 to 100.0. Can exceed 100 when overbooked.
    pub occupancy_percent: f64,
    /// Availability level.
    pub availability: Availability,
}

impl Occupancy {
    /// Summarize `visitors` against a facility of `total_spots`.
    #[must_use]
    pub fn from_visitors(visitors: &[Visitor], total_spots: u32, low_threshold: u32) -> Self {
        let active = visitors
            .iter()
            .filter(|v| v.is_active())
            .count();
        let left = visitors.len() - active;

        let occupied = u32::try_from(active).unwrap_or(u32::MAX);
        let available_spots = total_spots.saturating_sub(occupied);
        let occupancy_percent = if total_spots == 0 {
            0.0
        } else {
            f64::from(occupied) / f64::from(total_spots) * 100.0
        };

        let availability = if available_spots == 0 {
            Availability::Full
        } else if available_spots < low_threshold {
            Availability::Low
        } else {
            Availability::Open
        };

        Self {
            total_visitors: visitors.len(),
            active,
            left,
            total_spots,
            available_spots,
            occupancy_percent,
            availability,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::visitor::{VisitorId, VisitorStatus};

    fn visitors(active: usize, left: usize) -> Vec<Visitor> {
        let now = Utc::now();
        (0..active + left)
            .map(|i| Visitor {
                id: VisitorId::new(i64::try_from(i).unwrap()),
                name: format!("Visitor {i}"),
                ic_number: format!("IC-{i}"),
                license_plate: format!("P{i}"),
                unit_number: "A-1-01".to_string(),
                status: if i < active {
                    VisitorStatus::Active
                } else {
                    VisitorStatus::Left
                },
                registered_at: now,
                last_updated: now,
            })
            .collect()
    }

    #[test]
    fn test_empty_facility() {
        let occupancy = Occupancy::from_visitors(&[], 200, 20);

        assert_eq!(occupancy.total_visitors, 0);
        assert_eq!(occupancy.available_spots, 200);
        assert!(occupancy.occupancy_percent.abs() < f64::EPSILON);
        assert_eq!(occupancy.availability, Availability::Open);
    }

    #[test]
    fn test_counts_only_active_visitors() {
        let occupancy = Occupancy::from_visitors(&visitors(3, 2), 10, 2);

        assert_eq!(occupancy.total_visitors, 5);
        assert_eq!(occupancy.active, 3);
        assert_eq!(occupancy.left, 2);
        assert_eq!(occupancy.available_spots, 7);
        assert!((occupancy.occupancy_percent - 30.0).abs() < 1e-9);
        assert_eq!(occupancy.availability, Availability::Open);
    }

    #[test]
    fn test_low_availability() {
        let occupancy = Occupancy::from_visitors(&visitors(9, 0), 10, 2);
        assert_eq!(occupancy.available_spots, 1);
        assert_eq!(occupancy.availability, Availability::Low);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let occupancy = Occupancy::from_visitors(&visitors(8, 0), 10, 2);
        assert_eq!(occupancy.availability, Availability::Open);
    }

    #[test]
    fn test_full() {
        let occupancy = Occupancy::from_visitors(&visitors(10, 4), 10, 2);
        assert_eq!(occupancy.available_spots, 0);
        assert_eq!(occupancy.availability, Availability::Full);
    }

    #[test]
    fn test_overbooked_saturates() {
        let occupancy = Occupancy::from_visitors(&visitors(12, 0), 10, 2);
        assert_eq!(occupancy.available_spots, 0);
        assert!(occupancy.occupancy_percent > 100.0);
        assert_eq!(occupancy.availability, Availability::Full);
    }
}
