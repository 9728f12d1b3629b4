//! Weekly time slots. A slot is a (weekday, period) pair written as `월1`, `수3`.
//!
//! Catalog and LLM output use compact strings such as `월1,2,3 수4`: a day glyph
//! sets the current day and the bare periods after it inherit that day.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Highest teaching period of a day.
pub const MAX_PERIOD: u8 = 9;

/// Tokens meaning "no fixed slot" (online, asynchronous, not yet scheduled).
const UNSCHEDULED_MARKERS: &[&str] = &[
    "미정",
    "온라인",
    "사이버",
    "원격",
    "-",
    "tba",
    "online",
    "unscheduled",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Korean day glyph used in slot tokens.
    pub fn glyph(self) -> &'static str {
        match self {
            Weekday::Mon => "월",
            Weekday::Tue => "화",
            Weekday::Wed => "수",
            Weekday::Thu => "목",
            Weekday::Fri => "금",
        }
    }

    /// Accepts `월`, `월요일`, `Mon`, `mon`, `MONDAY`.
    pub fn from_label(label: &str) -> Result<Self, DomainError> {
        let label = label.trim();
        let short = label.strip_suffix("요일").unwrap_or(label);
        let lower = short.to_ascii_lowercase();
        let day = match (short, lower.as_str()) {
            ("월", _) | (_, "mon" | "monday") => Weekday::Mon,
            ("화", _) | (_, "tue" | "tuesday") => Weekday::Tue,
            ("수", _) | (_, "wed" | "wednesday") => Weekday::Wed,
            ("목", _) | (_, "thu" | "thursday") => Weekday::Thu,
            ("금", _) | (_, "fri" | "friday") => Weekday::Fri,
            ("토" | "일", _) | (_, "sat" | "saturday" | "sun" | "sunday") => {
                return Err(DomainError::InvalidSlot(format!(
                    "weekend day '{}' is not a teaching day",
                    label
                )));
            }
            _ => {
                return Err(DomainError::InvalidSlot(format!(
                    "unknown weekday '{}'",
                    label
                )));
            }
        };
        Ok(day)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Teaching period, always within `1..=MAX_PERIOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(u8);

impl Period {
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (1..=MAX_PERIOD).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidSlot(format!(
                "period {} is outside 1..={}",
                value, MAX_PERIOD
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn parse(digits: &str) -> Result<Self, DomainError> {
        let value: u8 = digits
            .parse()
            .map_err(|_| DomainError::InvalidSlot(format!("bad period '{}'", digits)))?;
        Self::new(value)
    }
}

/// One weekly (weekday, period) unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    pub day: Weekday,
    pub period: Period,
}

impl TimeSlot {
    pub fn new(day: Weekday, period: Period) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.day, self.period.0)
    }
}

impl FromStr for TimeSlot {
    type Err = DomainError;

    /// Parses exactly one slot token (`월1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let set = SlotSet::parse(s)?;
        let mut iter = set.iter();
        match (iter.next(), iter.next()) {
            (Some(slot), None) => Ok(*slot),
            (None, _) => Err(DomainError::InvalidSlot(format!(
                "'{}' does not name a slot",
                s
            ))),
            (Some(_), Some(_)) => Err(DomainError::InvalidSlot(format!(
                "'{}' names more than one slot",
                s
            ))),
        }
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Duplicate-free set of slots a course occupies. Empty means unscheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotSet(BTreeSet<TimeSlot>);

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a compact slot string such as `월1,2,3 수4` or `화5 목5`.
    ///
    /// Malformed tokens are rejected; an input made only of unscheduled markers
    /// (`미정`, `온라인`, `-`) yields an empty set.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut slots = BTreeSet::new();
        let mut day: Option<Weekday> = None;

        for token in input
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            if is_unscheduled_marker(token) {
                continue;
            }
            parse_token(token, &mut day, &mut slots)?;
        }

        Ok(Self(slots))
    }

    /// True when the course has no fixed slot (online / asynchronous).
    pub fn is_unscheduled(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.0.contains(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSlot> {
        self.0.iter()
    }

    /// Slots present in both sets, in weekday/period order.
    pub fn shared_with(&self, other: &SlotSet) -> Vec<TimeSlot> {
        self.0.intersection(&other.0).copied().collect()
    }
}

fn is_unscheduled_marker(token: &str) -> bool {
    let lower = token.to_lowercase();
    UNSCHEDULED_MARKERS.contains(&lower.as_str())
}

/// Parse one separator-free token. Handles glued forms like `월1수2` as well.
fn parse_token(
    token: &str,
    day: &mut Option<Weekday>,
    out: &mut BTreeSet<TimeSlot>,
) -> Result<(), DomainError> {
    let mut rest = token;
    while !rest.is_empty() {
        let label_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (label, tail) = rest.split_at(label_end);
        if !label.is_empty() {
            *day = Some(Weekday::from_label(label)?);
        }

        let digits_end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (digits, next) = tail.split_at(digits_end);
        if digits.is_empty() {
            return Err(DomainError::InvalidSlot(format!(
                "'{}' has no period number",
                token
            )));
        }
        let weekday = day.ok_or_else(|| {
            DomainError::InvalidSlot(format!("period '{}' has no weekday before it", token))
        })?;
        out.insert(TimeSlot::new(weekday, Period::parse(digits)?));
        rest = next;
    }
    Ok(())
}

impl FromIterator<TimeSlot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = TimeSlot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SlotSet {
    /// Canonical compact form: `월1,2,3 수4`. Empty sets render as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<Weekday> = None;
        for slot in &self.0 {
            match current {
                Some(day) if day == slot.day => write!(f, ",{}", slot.period.0)?,
                Some(_) => write!(f, " {}", slot)?,
                None => write!(f, "{}", slot)?,
            }
            current = Some(slot.day);
        }
        Ok(())
    }
}

impl FromStr for SlotSet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SlotSet {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotSet> for String {
    fn from(set: SlotSet) -> Self {
        set.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: Weekday, period: u8) -> TimeSlot {
        TimeSlot::new(day, Period::new(period).unwrap())
    }

    #[test]
    fn test_parse_single_token() {
        let s: TimeSlot = "월1".parse().unwrap();
        assert_eq!(s, slot(Weekday::Mon, 1));
        assert_eq!(s.to_string(), "월1");
    }

    #[test]
    fn test_parse_inherits_day() {
        let set = SlotSet::parse("월1,2,3").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&slot(Weekday::Mon, 3)));
    }

    #[test]
    fn test_parse_multiple_days_and_glued() {
        let set = SlotSet::parse("화4,5 목4").unwrap();
        assert_eq!(set.len(), 3);
        let glued = SlotSet::parse("월1수2").unwrap();
        assert!(glued.contains(&slot(Weekday::Mon, 1)));
        assert!(glued.contains(&slot(Weekday::Wed, 2)));
    }

    #[test]
    fn test_parse_english_labels() {
        let set = SlotSet::parse("Mon1 fri9").unwrap();
        assert!(set.contains(&slot(Weekday::Mon, 1)));
        assert!(set.contains(&slot(Weekday::Fri, 9)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = SlotSet::parse("월1 월1,1").unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unscheduled_markers() {
        assert!(SlotSet::parse("").unwrap().is_unscheduled());
        assert!(SlotSet::parse("미정").unwrap().is_unscheduled());
        assert!(SlotSet::parse(" 온라인 ").unwrap().is_unscheduled());
        assert!(SlotSet::parse("TBA").unwrap().is_unscheduled());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(SlotSet::parse("월0").is_err());
        assert!(SlotSet::parse("월10").is_err());
        assert!(SlotSet::parse("토1").is_err());
        assert!(SlotSet::parse("3").is_err());
        assert!(SlotSet::parse("월").is_err());
        assert!(SlotSet::parse("x1").is_err());
        assert!("월1,2".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_display_canonical() {
        let set = SlotSet::parse("수4 월3,1,2").unwrap();
        assert_eq!(set.to_string(), "월1,2,3 수4");
    }

    #[test]
    fn test_serde_as_string() {
        let set = SlotSet::parse("금1,2").unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"금1,2\"");
        let back: SlotSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<SlotSet>("\"금12\"").is_err());
    }
}
