//! Shift records.
//!
//! A shift is a block of volunteer work for a task at a facility, bounded by
//! a starting and an ending time and staffed by up to `slots` helpers.
//! Times are facility-local wall-clock values.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::organization::{
    ContactPerson, ContactPersonId, Facility, FacilityId, Related, Task, TaskId, Workplace,
    WorkplaceId,
};
use super::time::{day_qualifier, DisplayFormat};
use crate::define_id_type;

define_id_type!(i64, ShiftId);

/// Invariant violations on shift fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftValidationError {
    #[error("number of needed volunteers must not be negative (got {0})")]
    NegativeSlots(i32),

    #[error("ending time {ending} must be after starting time {starting}")]
    EndsBeforeStart {
        starting: NaiveDateTime,
        ending: NaiveDateTime,
    },
}

fn validate_fields(
    slots: i32,
    starting_time: NaiveDateTime,
    ending_time: NaiveDateTime,
) -> Result<(), ShiftValidationError> {
    if slots < 0 {
        return Err(ShiftValidationError::NegativeSlots(slots));
    }
    if ending_time <= starting_time {
        return Err(ShiftValidationError::EndsBeforeStart {
            starting: starting_time,
            ending: ending_time,
        });
    }
    Ok(())
}

/// A stored shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    /// Number of needed volunteers.
    pub slots: i32,
    pub task_id: TaskId,
    pub workplace_id: Option<WorkplaceId>,
    pub facility_id: FacilityId,
    pub starting_time: NaiveDateTime,
    pub ending_time: NaiveDateTime,
    /// Contact person to share with shift helpers.
    pub shift_contact_id: Option<ContactPersonId>,
}

/// A shift that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShift {
    pub slots: i32,
    pub task_id: TaskId,
    #[serde(default)]
    pub workplace_id: Option<WorkplaceId>,
    pub facility_id: FacilityId,
    pub starting_time: NaiveDateTime,
    pub ending_time: NaiveDateTime,
    #[serde(default)]
    pub shift_contact_id: Option<ContactPersonId>,
}

impl NewShift {
    pub fn validate(&self) -> Result<(), ShiftValidationError> {
        validate_fields(self.slots, self.starting_time, self.ending_time)
    }

    pub fn into_shift(self, id: ShiftId) -> Shift {
        Shift {
            id,
            slots: self.slots,
            task_id: self.task_id,
            workplace_id: self.workplace_id,
            facility_id: self.facility_id,
            starting_time: self.starting_time,
            ending_time: self.ending_time,
            shift_contact_id: self.shift_contact_id,
        }
    }
}

impl Shift {
    pub fn validate(&self) -> Result<(), ShiftValidationError> {
        validate_fields(self.slots, self.starting_time, self.ending_time)
    }

    /// Calendar days between the starting and the ending date.
    pub fn span_in_days(&self) -> i64 {
        (self.ending_time.date() - self.starting_time.date()).num_days()
    }

    pub fn starting_date(&self) -> NaiveDate {
        self.starting_time.date()
    }

    pub fn duration(&self) -> Duration {
        self.ending_time - self.starting_time
    }

    /// Ending time using the default display format.
    pub fn display_ending_time(&self) -> String {
        self.display_ending_time_with(&DisplayFormat::default())
    }

    /// Ending time, qualified with the day offset when the shift runs past
    /// midnight. A shift ending exactly at midnight gets no qualifier.
    pub fn display_ending_time_with(&self, format: &DisplayFormat) -> String {
        let ending_clock = self.ending_time.time();
        let days = if ending_clock > NaiveTime::MIN {
            self.span_in_days()
        } else {
            0
        };
        let time = format.localize_time(ending_clock);
        match day_qualifier(days) {
            Some(qualifier) => format!("{} {}", time, qualifier),
            None => time,
        }
        .trim()
        .to_string()
    }

    /// Planner page for this shift's facility on its starting date.
    pub fn canonical_url(&self) -> String {
        crate::routes::reverse_planner_by_facility(self.facility_id, self.starting_date())
    }

    /// Whether the shift has not ended yet at `now`.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        self.ending_time >= now
    }

    /// Whether any part of the shift falls on the given calendar day.
    pub fn overlaps_date(&self, date: NaiveDate) -> bool {
        let day_start = date.and_time(NaiveTime::MIN);
        let before_next_day = date
            .succ_opt()
            .map_or(true, |next| self.starting_time < next.and_time(NaiveTime::MIN));
        before_next_day && self.ending_time > day_start
    }
}

/// A shift loaded together with its task, workplace, facility and the
/// contact persons each of them names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDetail {
    pub shift: Shift,
    pub shift_contact: Option<ContactPerson>,
    pub task: Related<Task>,
    pub workplace: Option<Related<Workplace>>,
    pub facility: Related<Facility>,
}

impl ShiftDetail {
    /// Contact person for helpers: the shift's own, then the task's, then
    /// the workplace's, then the facility's.
    pub fn resolve_contact(&self) -> Option<&ContactPerson> {
        [
            self.shift_contact.as_ref(),
            self.task.shift_contact.as_ref(),
            self.workplace
                .as_ref()
                .and_then(|workplace| workplace.shift_contact.as_ref()),
        ]
        .into_iter()
        .flatten()
        .next()
        .or(self.facility.shift_contact.as_ref())
    }

    pub fn describe(&self) -> String {
        self.describe_with(&DisplayFormat::default())
    }

    pub fn describe_with(&self, format: &DisplayFormat) -> String {
        format!(
            "{} - {} ({} - {})",
            self.task.record.name,
            self.facility.record.name,
            format.localize_datetime(self.shift.starting_time),
            format.localize_datetime(self.shift.ending_time),
        )
    }
}

impl fmt::Display for ShiftDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn shift(starting_time: NaiveDateTime, ending_time: NaiveDateTime) -> Shift {
        Shift {
            id: ShiftId::new(1),
            slots: 3,
            task_id: TaskId::new(10),
            workplace_id: None,
            facility_id: FacilityId::new(7),
            starting_time,
            ending_time,
            shift_contact_id: None,
        }
    }

    fn contact(id: i64, name: &str) -> ContactPerson {
        ContactPerson {
            id: ContactPersonId::new(id),
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
        }
    }

    fn detail(
        shift_contact: Option<ContactPerson>,
        task_contact: Option<ContactPerson>,
        workplace_contact: Option<Option<ContactPerson>>,
        facility_contact: Option<ContactPerson>,
    ) -> ShiftDetail {
        let facility = Facility {
            id: FacilityId::new(7),
            name: "Central Station".to_string(),
            description: String::new(),
            shift_contact_id: facility_contact.as_ref().map(|c| c.id),
        };
        let workplace = workplace_contact.map(|contact| {
            Related::new(
                Workplace {
                    id: WorkplaceId::new(3),
                    facility_id: facility.id,
                    name: "Kitchen".to_string(),
                    description: String::new(),
                    shift_contact_id: contact.as_ref().map(|c| c.id),
                },
                contact,
            )
        });
        let task = Task {
            id: TaskId::new(10),
            facility_id: facility.id,
            workplace_id: workplace.as_ref().map(|w| w.record.id),
            name: "Food distribution".to_string(),
            description: String::new(),
            shift_contact_id: task_contact.as_ref().map(|c| c.id),
        };
        let mut record = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        record.workplace_id = workplace.as_ref().map(|w| w.record.id);
        record.shift_contact_id = shift_contact.as_ref().map(|c| c.id);

        ShiftDetail {
            shift: record,
            shift_contact,
            task: Related::new(task, task_contact),
            workplace,
            facility: Related::new(facility, facility_contact),
        }
    }

    #[test]
    fn test_same_day_ending_has_no_qualifier() {
        let s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        assert_eq!(s.span_in_days(), 0);
        assert_eq!(s.display_ending_time(), "17:00");
    }

    #[test]
    fn test_next_day_ending() {
        let s = shift(dt(2023, 5, 1, 22, 0), dt(2023, 5, 2, 8, 0));
        assert_eq!(s.span_in_days(), 1);
        assert_eq!(s.display_ending_time(), "08:00 the next day");
    }

    #[test]
    fn test_multi_day_ending() {
        let s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 4, 8, 0));
        assert_eq!(s.span_in_days(), 3);
        assert_eq!(s.display_ending_time(), "08:00 after 3 days");
    }

    #[test]
    fn test_midnight_ending_has_no_qualifier() {
        let s = shift(dt(2023, 5, 1, 18, 0), dt(2023, 5, 2, 0, 0));
        assert_eq!(s.span_in_days(), 1);
        assert_eq!(s.display_ending_time(), "00:00");

        let long = shift(dt(2023, 5, 1, 18, 0), dt(2023, 5, 4, 0, 0));
        assert_eq!(long.display_ending_time(), "00:00");
    }

    #[test]
    fn test_display_ending_time_with_custom_format() {
        let s = shift(dt(2023, 5, 1, 22, 0), dt(2023, 5, 2, 8, 15));
        let format = DisplayFormat::new("%H.%M Uhr", "%d.%m.%Y %H:%M").unwrap();
        assert_eq!(s.display_ending_time_with(&format), "08.15 Uhr the next day");
    }

    #[test]
    fn test_duration_and_starting_date() {
        let s = shift(dt(2023, 5, 1, 22, 0), dt(2023, 5, 2, 6, 30));
        assert_eq!(s.duration(), Duration::minutes(8 * 60 + 30));
        assert_eq!(s.starting_date(), NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    #[test]
    fn test_canonical_url() {
        let s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        assert_eq!(s.canonical_url(), "/shifts/7/2023/5/1/");
    }

    #[test]
    fn test_validation() {
        let s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        assert!(s.validate().is_ok());

        let mut negative = s.clone();
        negative.slots = -1;
        assert_eq!(
            negative.validate(),
            Err(ShiftValidationError::NegativeSlots(-1))
        );

        let backwards = shift(dt(2023, 5, 1, 17, 0), dt(2023, 5, 1, 9, 0));
        assert!(matches!(
            backwards.validate(),
            Err(ShiftValidationError::EndsBeforeStart { .. })
        ));

        let empty = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 9, 0));
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_zero_slots_allowed() {
        let mut s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        s.slots = 0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_overlaps_date() {
        let s = shift(dt(2023, 5, 1, 22, 0), dt(2023, 5, 2, 6, 0));
        assert!(s.overlaps_date(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()));
        assert!(s.overlaps_date(NaiveDate::from_ymd_opt(2023, 5, 2).unwrap()));
        assert!(!s.overlaps_date(NaiveDate::from_ymd_opt(2023, 5, 3).unwrap()));

        let until_midnight = shift(dt(2023, 5, 1, 18, 0), dt(2023, 5, 2, 0, 0));
        assert!(!until_midnight.overlaps_date(NaiveDate::from_ymd_opt(2023, 5, 2).unwrap()));
    }

    #[test]
    fn test_overlaps_last_representable_date() {
        let last = NaiveDate::MAX;
        let s = shift(
            last.and_hms_opt(8, 0, 0).unwrap(),
            last.and_hms_opt(17, 0, 0).unwrap(),
        );
        assert!(s.overlaps_date(last));
        assert!(!s.overlaps_date(last.pred_opt().unwrap()));
    }

    #[test]
    fn test_ending_time_is_trimmed() {
        let format = DisplayFormat::new("%H:%M ", "%Y-%m-%d %H:%M").unwrap();
        let same_day = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        assert_eq!(same_day.display_ending_time_with(&format), "17:00");

        let padded = DisplayFormat::new(" %H:%M", "%Y-%m-%d %H:%M").unwrap();
        let overnight = shift(dt(2023, 5, 1, 22, 0), dt(2023, 5, 2, 6, 0));
        assert_eq!(
            overnight.display_ending_time_with(&padded),
            "06:00 the next day"
        );
    }

    #[test]
    fn test_is_open_at() {
        let s = shift(dt(2023, 5, 1, 9, 0), dt(2023, 5, 1, 17, 0));
        assert!(s.is_open_at(dt(2023, 5, 1, 12, 0)));
        assert!(s.is_open_at(dt(2023, 5, 1, 17, 0)));
        assert!(!s.is_open_at(dt(2023, 5, 1, 17, 1)));
    }

    #[test]
    fn test_resolve_contact_prefers_shift_contact() {
        let d = detail(
            Some(contact(1, "Shift")),
            Some(contact(2, "Task")),
            Some(Some(contact(3, "Workplace"))),
            Some(contact(4, "Facility")),
        );
        assert_eq!(d.resolve_contact().map(|c| c.name.as_str()), Some("Shift"));
    }

    #[test]
    fn test_resolve_contact_falls_back_to_task() {
        let d = detail(
            None,
            Some(contact(2, "Task")),
            Some(Some(contact(3, "Workplace"))),
            Some(contact(4, "Facility")),
        );
        assert_eq!(d.resolve_contact().map(|c| c.name.as_str()), Some("Task"));
    }

    #[test]
    fn test_resolve_contact_falls_back_to_workplace() {
        let d = detail(
            None,
            None,
            Some(Some(contact(3, "Workplace"))),
            Some(contact(4, "Facility")),
        );
        assert_eq!(
            d.resolve_contact().map(|c| c.name.as_str()),
            Some("Workplace")
        );
    }

    #[test]
    fn test_resolve_contact_falls_back_to_facility() {
        let without_workplace = detail(None, None, None, Some(contact(4, "Facility")));
        assert_eq!(
            without_workplace.resolve_contact().map(|c| c.name.as_str()),
            Some("Facility")
        );

        let workplace_without_contact = detail(None, None, Some(None), Some(contact(4, "Facility")));
        assert_eq!(
            workplace_without_contact
                .resolve_contact()
                .map(|c| c.name.as_str()),
            Some("Facility")
        );
    }

    #[test]
    fn test_resolve_contact_none_anywhere() {
        let d = detail(None, None, Some(None), None);
        assert!(d.resolve_contact().is_none());
    }

    #[test]
    fn test_describe() {
        let d = detail(None, None, None, None);
        assert_eq!(
            d.describe(),
            "Food distribution - Central Station (2023-05-01 09:00 - 2023-05-01 17:00)"
        );
        assert_eq!(d.to_string(), d.describe());
    }
}
