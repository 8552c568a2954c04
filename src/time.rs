//! Timestamp layout and time zone resolution

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use miette::Diagnostic;
use thiserror::Error;

/// The only accepted timestamp layout: `2020-12-26 14:20:33`
pub const LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

// how far back a skipped wall-clock time looks for the offset before the gap
const GAP_STEP_MINUTES: i64 = 15;
const GAP_MAX_STEPS: i64 = 4 * 48;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("expected layout YYYY-MM-DD HH:MM:SS")]
    Layout(#[from] chrono::ParseError),

    #[error("{0} cannot be placed in time zone {1}")]
    Unresolvable(NaiveDateTime, Zone),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("invalid time zone '{0}'")]
#[diagnostic(
    code(condq::invalid_zone),
    help("use UTC, local, an IANA name such as Asia/Tokyo, or an offset such as +09:00")
)]
pub struct ZoneError(pub String);

/// Time zone a timestamp's wall-clock reading is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
    /// An IANA zone, with its daylight saving rules
    Named(Tz),
}

impl Zone {
    /// Offset east of UTC, in seconds
    pub fn east(secs: i32) -> Option<Zone> {
        FixedOffset::east_opt(secs).map(Zone::Fixed)
    }

    /// Pin a wall-clock reading to this zone.
    ///
    /// A reading repeated by a backward transition resolves to the earlier
    /// instant. A reading skipped by a forward transition is read with the
    /// offset in effect before the gap, which lands it after the gap by the
    /// size of the jump (02:30 on a spring-forward night becomes 03:30).
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, TimeError> {
        match self {
            Zone::Utc => Ok(fixed(Utc.from_utc_datetime(&naive))),
            Zone::Local => self.resolve(naive, &Local),
            Zone::Fixed(offset) => self.resolve(naive, offset),
            Zone::Named(tz) => self.resolve(naive, tz),
        }
    }

    fn resolve<T: TimeZone>(
        &self,
        naive: NaiveDateTime,
        tz: &T,
    ) -> Result<DateTime<FixedOffset>, TimeError> {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(fixed(dt)),
            LocalResult::Ambiguous(earliest, _) => Ok(fixed(earliest)),
            LocalResult::None => {
                let before = (1..=GAP_MAX_STEPS).find_map(|step| {
                    let earlier = naive - Duration::minutes(step * GAP_STEP_MINUTES);
                    tz.from_local_datetime(&earlier).earliest()
                });
                let offset = before
                    .map(|dt| dt.offset().fix())
                    .ok_or(TimeError::Unresolvable(naive, *self))?;
                let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
                Ok(fixed(tz.from_utc_datetime(&utc)))
            }
        }
    }
}

fn fixed<T: TimeZone>(dt: DateTime<T>) -> DateTime<FixedOffset> {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => f.write_str("UTC"),
            Zone::Local => f.write_str("local"),
            Zone::Fixed(offset) => write!(f, "{}", offset),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    /// Accepts `UTC`, `Z`, `local`, IANA names such as `Asia/Tokyo`, and
    /// `+HH`, `+HH:MM` and `+HHMM` (or `-`) offsets
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "UTC" | "utc" | "Z" | "z" => return Ok(Zone::Utc),
            "local" | "Local" => return Ok(Zone::Local),
            _ => {}
        }

        let invalid = || ZoneError(s.to_owned());

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return s.parse::<Tz>().map(Zone::Named).map_err(|_| invalid()),
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || rest.matches(':').count() > 1 {
            return Err(invalid());
        }

        let (hours, minutes) = match digits.len() {
            2 => (&digits[..2], "0"),
            4 => (&digits[..2], &digits[2..]),
            _ => return Err(invalid()),
        };

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        Zone::east(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
    }
}

/// Parse `s` against [`LAYOUT`] in `zone`
pub fn parse_timestamp(s: &str, zone: &Zone) -> Result<DateTime<FixedOffset>, TimeError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), LAYOUT)?;
    zone.localize(naive)
}

/// The zero timestamp: the Unix epoch in UTC
pub fn epoch() -> DateTime<FixedOffset> {
    fixed(Utc.from_utc_datetime(&NaiveDateTime::default()))
}
