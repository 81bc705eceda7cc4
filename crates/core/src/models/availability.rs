use std::iter;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::time_of_day::TimeOfDay,
};

pub const MIN_SLOT_DURATION: u32 = 5;
pub const MAX_SLOT_DURATION: u32 = 120;

/// Day of the week, numbered from Sunday as stored in `availability_windows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let day = match name.to_ascii_uppercase().as_str() {
            "SUNDAY" => DayOfWeek::Sunday,
            "MONDAY" => DayOfWeek::Monday,
            "TUESDAY" => DayOfWeek::Tuesday,
            "WEDNESDAY" => DayOfWeek::Wednesday,
            "THURSDAY" => DayOfWeek::Thursday,
            "FRIDAY" => DayOfWeek::Friday,
            "SATURDAY" => DayOfWeek::Saturday,
            _ => return None,
        };
        Some(day)
    }

    /// The weekday `date` falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.index()
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(index) => DayOfWeek::from_index(index)
                .ok_or_else(|| de::Error::custom("day_of_week must be between 0 (Sunday) and 6 (Saturday)")),
            Repr::Name(name) => DayOfWeek::from_name(&name)
                .ok_or_else(|| de::Error::custom(format!("unknown day of week '{}'", name))),
        }
    }
}

/// A recurring weekly block during which a doctor accepts bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub slot_duration: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// Slot start times inside the window: from `start_time` in steps of
    /// `slot_duration`, strictly before `end_time`.
    ///
    /// Only the start is bounded, so the last slot overruns `end_time` when
    /// the duration does not divide the window.
    pub fn slot_starts(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        let step = self.slot_duration.max(1);
        iter::successors(Some(self.start_time), move |current| current.checked_add_minutes(step))
            .take_while(|current| *current < self.end_time)
    }
}

/// A window about to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailabilityWindow {
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub slot_duration: u32,
    pub is_active: bool,
}

impl NewAvailabilityWindow {
    pub fn validate(&self) -> ClinicResult<()> {
        if self.start_time >= self.end_time {
            return Err(ClinicError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }
        if !(MIN_SLOT_DURATION..=MAX_SLOT_DURATION).contains(&self.slot_duration) {
            return Err(ClinicError::Validation(format!(
                "Slot duration must be between {}-{} minutes",
                MIN_SLOT_DURATION, MAX_SLOT_DURATION
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub slot_duration: u32,
    pub is_active: Option<bool>,
}

impl CreateAvailabilityRequest {
    pub fn into_new_window(self, doctor_id: Uuid) -> NewAvailabilityWindow {
        NewAvailabilityWindow {
            doctor_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            slot_duration: self.slot_duration,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub availability: AvailabilityWindow,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAvailabilityResponse {
    pub availabilities: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_active: bool,
}
