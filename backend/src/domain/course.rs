//! Course catalogue model: codes, weekly meeting times and editable details.
//!
//! Meeting times follow the registrar's wall-clock convention. A `ClockTime`
//! is a zero-padded `HH:MM` string whose ordering key is the integer left
//! after removing the colon (`"09:30"` becomes `930`). Overlap checks compare
//! those integers directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum allowed length of a course code.
pub const COURSE_CODE_MAX: usize = 32;
/// Upper bound accepted for credit values.
pub const CREDITS_MAX: i64 = 100;
/// Largest seat count a course may offer; matches the `INTEGER` column.
pub const CAPACITY_MAX: i64 = i32::MAX as i64;

/// Validation errors raised while constructing course values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    InvalidId,
    EmptyCode,
    CodeTooLong { max: usize },
    EmptyField { field: &'static str },
    CreditsOutOfRange { max: i64 },
    CapacityTooSmall,
    CapacityTooLarge { max: i64 },
    UnknownWeekday,
    InvalidClockTime { field: &'static str },
    EndNotAfterStart,
}

impl CourseValidationError {
    /// Name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyCode | Self::CodeTooLong { .. } => "code",
            Self::EmptyField { field } | Self::InvalidClockTime { field } => *field,
            Self::CreditsOutOfRange { .. } => "credits",
            Self::CapacityTooSmall | Self::CapacityTooLarge { .. } => "capacity",
            Self::UnknownWeekday => "day",
            Self::EndNotAfterStart => "end_time",
        }
    }

    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyCode | Self::EmptyField { .. } => "empty",
            Self::CodeTooLong { .. } => "too_long",
            Self::CreditsOutOfRange { .. } => "out_of_range",
            Self::CapacityTooSmall => "too_small",
            Self::CapacityTooLarge { .. } => "too_large",
            Self::UnknownWeekday => "unknown_weekday",
            Self::InvalidClockTime { .. } => "invalid_time",
            Self::EndNotAfterStart => "end_before_start",
        }
    }
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "course id must be a positive integer"),
            Self::EmptyCode => write!(f, "course code must not be empty"),
            Self::CodeTooLong { max } => write!(f, "course code must be at most {max} characters"),
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::CreditsOutOfRange { max } => write!(f, "credits must be between 0 and {max}"),
            Self::CapacityTooSmall => write!(f, "capacity must be at least 1"),
            Self::CapacityTooLarge { max } => write!(f, "capacity must be at most {max}"),
            Self::UnknownWeekday => write!(f, "day must be a weekday name such as Monday"),
            Self::InvalidClockTime { field } => write!(f, "{field} must be a HH:MM time"),
            Self::EndNotAfterStart => write!(f, "end_time must be later than start_time"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

/// Store-allocated course identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CourseId(i64);

impl CourseId {
    /// Validate and construct a [`CourseId`].
    pub fn new(id: i64) -> Result<Self, CourseValidationError> {
        if id <= 0 {
            return Err(CourseValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Raw integer value as stored.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CourseId> for i64 {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for CourseId {
    type Error = CourseValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique catalogue code such as `CS101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Validate and construct a [`CourseCode`]; surrounding whitespace is trimmed.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CourseValidationError::EmptyCode);
        }
        if trimmed.chars().count() > COURSE_CODE_MAX {
            return Err(CourseValidationError::CodeTooLong {
                max: COURSE_CODE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Day of the week a course meets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Capitalised English name used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(needle))
            .ok_or(CourseValidationError::UnknownWeekday)
    }
}

impl From<Weekday> for String {
    fn from(value: Weekday) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for Weekday {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Wall-clock time of day in strict `HH:MM` form.
///
/// # Examples
/// ```
/// use registrar::domain::ClockTime;
///
/// let time: ClockTime = "09:30".parse().unwrap();
/// assert_eq!(time.ordinal(), 930);
/// assert!("9:30".parse::<ClockTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Construct from hour and minute components.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Ordering key: the decimal `HHMM` value with the colon removed.
    pub fn ordinal(self) -> u16 {
        u16::from(self.hour) * 100 + u16::from(self.minute)
    }

    fn parse_field(raw: &str, field: &'static str) -> Result<Self, CourseValidationError> {
        let invalid = || CourseValidationError::InvalidClockTime { field };
        let bytes = raw.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
        let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field(s.trim(), "time")
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ClockTime {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Weekly slot a course occupies.
///
/// ## Invariants
/// - `start` is strictly earlier than `end`; both fall on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeetingTime {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
}

impl MeetingTime {
    /// Validate and construct a [`MeetingTime`].
    pub fn new(
        day: Weekday,
        start: ClockTime,
        end: ClockTime,
    ) -> Result<Self, CourseValidationError> {
        if start >= end {
            return Err(CourseValidationError::EndNotAfterStart);
        }
        Ok(Self { day, start, end })
    }

    /// Parse a meeting time from the raw request or storage strings.
    pub fn parse(day: &str, start: &str, end: &str) -> Result<Self, CourseValidationError> {
        let day = day.parse()?;
        let start = ClockTime::parse_field(start.trim(), "start_time")?;
        let end = ClockTime::parse_field(end.trim(), "end_time")?;
        Self::new(day, start, end)
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Whether `self` (the candidate) collides with an already held slot.
    ///
    /// Slots on different days never overlap. On the same day the candidate
    /// overlaps when it starts inside the held slot, ends inside it, or fully
    /// covers it. Touching boundaries (one ends when the other starts) do not
    /// count.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::MeetingTime;
    ///
    /// let held = MeetingTime::parse("Monday", "09:00", "10:00").unwrap();
    /// let late = MeetingTime::parse("Monday", "09:50", "10:50").unwrap();
    /// let next = MeetingTime::parse("Monday", "10:00", "11:00").unwrap();
    /// assert!(late.overlaps(&held));
    /// assert!(!next.overlaps(&held));
    /// ```
    pub fn overlaps(&self, held: &MeetingTime) -> bool {
        if self.day != held.day {
            return false;
        }
        let (cs, ce) = (self.start.ordinal(), self.end.ordinal());
        let (rs, re) = (held.start.ordinal(), held.end.ordinal());
        (cs >= rs && cs < re) || (ce > rs && ce <= re) || (cs <= rs && ce >= re)
    }
}

/// Course fields an administrator may edit after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub name: String,
    pub instructor: String,
    pub credits: u32,
    pub capacity: u32,
    pub schedule: MeetingTime,
    pub semester: String,
    pub description: Option<String>,
}

/// Unvalidated course fields as supplied by a client.
#[derive(Debug, Clone, Copy)]
pub struct CourseDraft<'a> {
    pub name: &'a str,
    pub instructor: &'a str,
    pub credits: i64,
    pub capacity: i64,
    pub day: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub semester: &'a str,
    pub description: Option<&'a str>,
}

fn required(value: &str, field: &'static str) -> Result<String, CourseValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CourseValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl CourseDetails {
    /// Validate a client draft into editable course details.
    pub fn try_from_draft(draft: CourseDraft<'_>) -> Result<Self, CourseValidationError> {
        let name = required(draft.name, "name")?;
        let instructor = required(draft.instructor, "instructor")?;
        let credits = u32::try_from(draft.credits)
            .ok()
            .filter(|value| i64::from(*value) <= CREDITS_MAX)
            .ok_or(CourseValidationError::CreditsOutOfRange { max: CREDITS_MAX })?;
        if draft.capacity < 1 {
            return Err(CourseValidationError::CapacityTooSmall);
        }
        let capacity = u32::try_from(draft.capacity)
            .ok()
            .filter(|_| draft.capacity <= CAPACITY_MAX)
            .ok_or(CourseValidationError::CapacityTooLarge { max: CAPACITY_MAX })?;
        let schedule = MeetingTime::parse(draft.day, draft.start_time, draft.end_time)?;
        let semester = required(draft.semester, "semester")?;
        let description = draft
            .description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        Ok(Self {
            name,
            instructor,
            credits,
            capacity,
            schedule,
            semester,
            description,
        })
    }
}

/// Course about to be inserted; `enrolled` starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub code: CourseCode,
    pub details: CourseDetails,
}

/// Catalogue entry with its cached enrollment counter.
///
/// ## Invariants
/// - `enrolled` equals the number of registrations referencing the course
///   and never exceeds `details.capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub code: CourseCode,
    pub details: CourseDetails,
    pub enrolled: u32,
}

impl Course {
    /// Whether every seat is taken.
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.details.capacity
    }
}
