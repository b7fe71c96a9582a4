//! Calendar-day keys and the normaliser that produces them.
//!
//! Completion tracking works in whole days of one fixed reference time zone.
//! Every moment that enters the engine, whether an instant, a bare date, or a
//! string from the wire, is truncated to a [`DayKey`] in that zone before it
//! touches a completion set.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── DayKey ──────────────────────────────────────────────────────────────────

/// A calendar day with no time-of-day component. Serialised as `YYYY-MM-DD`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
  pub const fn new(date: NaiveDate) -> Self { Self(date) }

  /// Build from calendar components; `None` if the date does not exist.
  pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
    NaiveDate::from_ymd_opt(year, month, day).map(Self)
  }

  pub fn date(self) -> NaiveDate { self.0 }

  /// The following day, `None` only at the end of the representable range.
  pub fn succ(self) -> Option<Self> { self.0.succ_opt().map(Self) }

  /// The preceding day, `None` only at the start of the representable range.
  pub fn pred(self) -> Option<Self> { self.0.pred_opt().map(Self) }

  /// Signed number of days from `self` to `other` (`other - self`).
  pub fn days_until(self, other: Self) -> i64 { (other.0 - self.0).num_days() }

  /// Whether `other` is exactly the day after `self`.
  pub fn is_followed_by(self, other: Self) -> bool { self.days_until(other) == 1 }
}

impl From<NaiveDate> for DayKey {
  fn from(date: NaiveDate) -> Self { Self(date) }
}

impl fmt::Display for DayKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format("%Y-%m-%d"))
  }
}

impl FromStr for DayKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
      .map(Self)
      .map_err(|_| Error::InvalidDate(s.to_owned()))
  }
}

// ─── Reference zone ──────────────────────────────────────────────────────────

/// The single time zone in which instants are truncated to days.
///
/// Fixed per deployment so that normalisation does not depend on the host's
/// ambient local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone(Tz);

impl ReferenceZone {
  pub const UTC: Self = Self(chrono_tz::UTC);

  pub const fn new(tz: Tz) -> Self { Self(tz) }

  pub fn tz(self) -> Tz { self.0 }

  pub fn name(self) -> &'static str { self.0.name() }

  /// The calendar day `now` falls on in this zone.
  pub fn today(self, now: DateTime<Utc>) -> DayKey { self.day_of(now) }

  fn day_of(self, instant: DateTime<Utc>) -> DayKey {
    DayKey(instant.with_timezone(&self.0).date_naive())
  }
}

impl Default for ReferenceZone {
  fn default() -> Self { Self::UTC }
}

impl FromStr for ReferenceZone {
  type Err = Error;

  /// Parse an IANA zone name such as `Europe/Berlin`.
  fn from_str(s: &str) -> Result<Self> {
    s.trim()
      .parse::<Tz>()
      .map(Self)
      .map_err(|_| Error::UnknownTimeZone(s.to_owned()))
  }
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Any representation of a moment the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moment {
  /// An absolute point in time.
  Instant(DateTime<Utc>),
  /// A calendar date already expressed in the reference zone.
  Date(NaiveDate),
  /// An ISO 8601 string: `YYYY-MM-DD`, RFC 3339, or a naive local date-time.
  Text(String),
}

impl From<DateTime<Utc>> for Moment {
  fn from(instant: DateTime<Utc>) -> Self { Self::Instant(instant) }
}

impl From<NaiveDate> for Moment {
  fn from(date: NaiveDate) -> Self { Self::Date(date) }
}

impl From<DayKey> for Moment {
  fn from(day: DayKey) -> Self { Self::Date(day.0) }
}

impl From<&str> for Moment {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Moment {
  fn from(s: String) -> Self { Self::Text(s) }
}

/// Truncate `moment` to its calendar day in `zone`.
///
/// Two moments on the same reference-zone day always yield the same key.
/// Text that is not one of the accepted ISO forms is rejected with
/// [`Error::InvalidDate`]; it is never coerced.
pub fn normalize(moment: &Moment, zone: ReferenceZone) -> Result<DayKey> {
  match moment {
    Moment::Instant(instant) => Ok(zone.day_of(*instant)),
    Moment::Date(date) => Ok(DayKey(*date)),
    Moment::Text(text) => normalize_text(text, zone),
  }
}

fn normalize_text(text: &str, zone: ReferenceZone) -> Result<DayKey> {
  let s = text.trim();

  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(DayKey(date));
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(zone.day_of(dt.with_timezone(&Utc)));
  }
  // No offset: the wall-clock time is already in the reference zone.
  if let Ok(local) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(DayKey(local.date()));
  }

  Err(Error::InvalidDate(text.to_owned()))
}

/// Sort ascending and drop duplicate days.
pub fn dedup_sorted(keys: impl IntoIterator<Item = DayKey>) -> Vec<DayKey> {
  let mut keys: Vec<DayKey> = keys.into_iter().collect();
  keys.sort_unstable();
  keys.dedup();
  keys
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> DayKey { DayKey::from_ymd(y, m, d).unwrap() }

  #[test]
  fn instants_on_the_same_zone_day_share_a_key() {
    let zone = ReferenceZone::UTC;
    let morning = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 1).unwrap();
    let night = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();

    assert_eq!(normalize(&morning.into(), zone).unwrap(), day(2024, 3, 10));
    assert_eq!(normalize(&night.into(), zone).unwrap(), day(2024, 3, 10));
  }

  #[test]
  fn instants_truncate_in_the_reference_zone() {
    let zone: ReferenceZone = "America/New_York".parse().unwrap();
    // 03:00 UTC is still the previous evening in New York.
    let instant = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();
    assert_eq!(normalize(&instant.into(), zone).unwrap(), day(2024, 3, 9));

    let zone: ReferenceZone = "Asia/Tokyo".parse().unwrap();
    let instant = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
    assert_eq!(normalize(&instant.into(), zone).unwrap(), day(2024, 3, 11));
  }

  #[test]
  fn text_forms_are_accepted() {
    let zone = ReferenceZone::UTC;
    for input in [
      "2024-03-10",
      " 2024-03-10 ",
      "2024-03-10T23:30:00Z",
      "2024-03-10T08:00:00+02:00",
      "2024-03-10T12:34:56",
      "2024-03-10T12:34:56.789",
    ] {
      assert_eq!(
        normalize(&Moment::from(input), zone).unwrap(),
        day(2024, 3, 10),
        "input {input:?}"
      );
    }
  }

  #[test]
  fn rfc3339_offsets_are_converted_before_truncation() {
    let zone = ReferenceZone::UTC;
    let key = normalize(&Moment::from("2024-03-10T01:00:00+05:00"), zone).unwrap();
    assert_eq!(key, day(2024, 3, 9));
  }

  #[test]
  fn malformed_text_is_rejected() {
    let zone = ReferenceZone::UTC;
    for input in ["", "yesterday", "2024-02-30", "2024/03/10", "10-03-2024"] {
      let err = normalize(&Moment::from(input), zone).unwrap_err();
      assert!(matches!(err, Error::InvalidDate(_)), "input {input:?}");
    }
  }

  #[test]
  fn unknown_zone_is_rejected() {
    let err = "Mars/Olympus_Mons".parse::<ReferenceZone>().unwrap_err();
    assert!(matches!(err, Error::UnknownTimeZone(_)));
  }

  #[test]
  fn dedup_sorted_orders_and_collapses() {
    let keys = dedup_sorted([
      day(2024, 1, 3),
      day(2024, 1, 1),
      day(2024, 1, 3),
      day(2023, 12, 31),
      day(2024, 1, 1),
    ]);
    assert_eq!(keys, vec![day(2023, 12, 31), day(2024, 1, 1), day(2024, 1, 3)]);

    let again = dedup_sorted(keys.clone());
    assert_eq!(again, keys);
    assert!(dedup_sorted([]).is_empty());
  }

  #[test]
  fn day_key_display_and_parse_agree() {
    let key = day(2024, 2, 29);
    assert_eq!(key.to_string(), "2024-02-29");
    assert_eq!("2024-02-29".parse::<DayKey>().unwrap(), key);
    assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-02-29\"");
  }

  #[test]
  fn consecutive_days_cross_month_and_year_boundaries() {
    assert!(day(2024, 2, 29).is_followed_by(day(2024, 3, 1)));
    assert!(day(2023, 12, 31).is_followed_by(day(2024, 1, 1)));
    assert!(!day(2024, 1, 1).is_followed_by(day(2024, 1, 3)));
    assert_eq!(day(2024, 1, 10).days_until(day(2024, 1, 7)), -3);
  }
}
