//! Broadcast schedule
//!
//! The station runs a fixed weekly-less schedule keyed on the hour of day.
//! Slots may wrap past midnight (`start_hour > end_hour`), and the first
//! matching slot wins, so specific shows are listed before the catch-all
//! AUTODJ entry.

use serde::{Deserialize, Serialize};

/// How a slot's content is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Curated or live show
    Show,
    /// Randomized selection
    Random,
}

/// One schedule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScheduleSlot {
    /// First hour the slot is active (0-23)
    pub start_hour: u8,
    /// Hour the slot ends, exclusive (0-24). A value below `start_hour`
    /// wraps past midnight.
    pub end_hour: u8,
    /// Station name as registered in Liquidsoap
    pub station: String,
    pub kind: SlotKind,
}

impl ScheduleSlot {
    pub fn new(start_hour: u8, end_hour: u8, station: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            start_hour,
            end_hour,
            station: station.into(),
            kind,
        }
    }

    /// Whether this slot covers the given hour
    pub fn contains(&self, hour: u8) -> bool {
        let hour = hour % 24;
        if self.start_hour > self.end_hour {
            // Wraps past midnight, e.g. 22-02
            hour >= self.start_hour || hour < self.end_hour
        } else {
            hour >= self.start_hour && hour < self.end_hour
        }
    }
}

/// The ordered slot table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    slots: Vec<ScheduleSlot>,
}

impl Schedule {
    pub fn new(slots: Vec<ScheduleSlot>) -> Self {
        Self { slots }
    }

    /// The appliance's stock schedule
    ///
    /// Ends with the AUTODJ catch-all so every hour resolves to a station.
    pub fn stock() -> Self {
        Self::new(vec![
            ScheduleSlot::new(22, 2, "Noisefloor", SlotKind::Random),
            ScheduleSlot::new(10, 11, "Pandora's Box", SlotKind::Show),
            ScheduleSlot::new(17, 18, "Pandora's Box", SlotKind::Show),
            ScheduleSlot::new(0, 24, "AUTODJ", SlotKind::Show),
        ])
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    /// The slot active at the given hour (first match wins)
    pub fn slot_at(&self, hour: u8) -> Option<&ScheduleSlot> {
        self.slots.iter().find(|slot| slot.contains(hour))
    }

    /// The station scheduled for the given hour
    pub fn station_at(&self, hour: u8) -> Option<&str> {
        self.slot_at(hour).map(|slot| slot.station.as_str())
    }

    /// The next hour at which the scheduled station changes
    ///
    /// Scans up to 24 hours ahead; returns `None` when a single station
    /// holds the whole day.
    pub fn next_change(&self, hour: u8) -> Option<(u8, &ScheduleSlot)> {
        let current = self.station_at(hour);

        for offset in 1..=24u8 {
            let probe = (hour + offset) % 24;
            let slot = self.slot_at(probe)?;
            if Some(slot.station.as_str()) != current {
                return Some((probe, slot));
            }
        }

        None
    }

    /// Distinct station names, in slot order
    pub fn stations(&self) -> Vec<String> {
        let mut stations: Vec<String> = Vec::new();
        for slot in &self.slots {
            if !stations.iter().any(|s| s == &slot.station) {
                stations.push(slot.station.clone());
            }
        }
        stations
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::stock()
    }
}

/// Formats an hour of day in listener-facing 12-hour form
///
/// `0` and `24` render as `12am`, `12` as `12pm`.
pub fn format_hour(hour: u8) -> String {
    match hour % 24 {
        0 => "12am".to_string(),
        12 => "12pm".to_string(),
        h if h < 12 => format!("{}am", h),
        h => format!("{}pm", h - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_midnight_wrap() {
        let slot = ScheduleSlot::new(22, 2, "Noisefloor", SlotKind::Random);

        assert!(slot.contains(22));
        assert!(slot.contains(23));
        assert!(slot.contains(0));
        assert!(slot.contains(1));

        assert!(!slot.contains(2));
        assert!(!slot.contains(12));
        assert!(!slot.contains(21));
    }

    #[test]
    fn test_first_match_wins() {
        let schedule = Schedule::stock();

        // Noisefloor overlaps the AUTODJ catch-all but is listed first
        assert_eq!(schedule.station_at(23), Some("Noisefloor"));
        assert_eq!(schedule.station_at(1), Some("Noisefloor"));
        assert_eq!(schedule.station_at(10), Some("Pandora's Box"));
        assert_eq!(schedule.station_at(17), Some("Pandora's Box"));
        assert_eq!(schedule.station_at(3), Some("AUTODJ"));
        assert_eq!(schedule.station_at(11), Some("AUTODJ"));
    }

    #[test]
    fn test_next_change() {
        let schedule = Schedule::stock();

        // 23h is Noisefloor; the next different station starts at 2am
        let (hour, slot) = schedule.next_change(23).unwrap();
        assert_eq!(hour, 2);
        assert_eq!(slot.station, "AUTODJ");

        // 9am is AUTODJ; Pandora's Box starts at 10am
        let (hour, slot) = schedule.next_change(9).unwrap();
        assert_eq!(hour, 10);
        assert_eq!(slot.station, "Pandora's Box");

        // 10am is Pandora's Box; back to AUTODJ at 11am
        let (hour, _) = schedule.next_change(10).unwrap();
        assert_eq!(hour, 11);
    }

    #[test]
    fn test_next_change_none_for_constant_schedule() {
        let schedule = Schedule::new(vec![ScheduleSlot::new(0, 24, "AUTODJ", SlotKind::Show)]);
        assert!(schedule.next_change(5).is_none());
    }

    #[test]
    fn test_stations_are_distinct_and_ordered() {
        let schedule = Schedule::stock();
        assert_eq!(
            schedule.stations(),
            vec!["Noisefloor", "Pandora's Box", "AUTODJ"]
        );
    }

    #[test]
    fn test_empty_schedule_has_no_station() {
        let schedule = Schedule::new(vec![]);
        assert_eq!(schedule.station_at(12), None);
        assert!(schedule.next_change(12).is_none());
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "12am");
        assert_eq!(format_hour(9), "9am");
        assert_eq!(format_hour(12), "12pm");
        assert_eq!(format_hour(17), "5pm");
        assert_eq!(format_hour(23), "11pm");
        assert_eq!(format_hour(24), "12am");
    }

    #[test]
    fn test_slot_round_trips_through_yaml() {
        let yaml = "start_hour: 22\nend_hour: 2\nstation: Noisefloor\nkind: random";
        let slot: ScheduleSlot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(slot, ScheduleSlot::new(22, 2, "Noisefloor", SlotKind::Random));
    }
}
