//! Work-week window arithmetic.

use crate::error::{ReportError, Result};
use crate::model::DateRange;
use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

/// Last day covered by the window unless `week_end=` overrides it.
pub const DEFAULT_WEEK_END: Weekday = Weekday::Fri;

/// Monday through `week_end` of the week containing a given date, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate, week_end: Weekday) -> Self {
        let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let end = start + Duration::days(i64::from(week_end.num_days_from_monday()));
        Self { start, end }
    }

    pub fn current(week_end: Weekday) -> Self {
        Self::containing(Local::now().date_naive(), week_end)
    }

    /// Resolve the window to instants: `start 00:00:00` through `end 23:59:59`, local time.
    pub fn range(&self) -> Result<DateRange> {
        let since = self
            .start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ReportError::InvalidDate(format!("Invalid start of week: {}", self.start)))?;
        let until = self
            .end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| ReportError::InvalidDate(format!("Invalid end of week: {}", self.end)))?;

        Ok(DateRange::new()
            .with_since(local_to_utc(&since, true)?)
            .with_until(local_to_utc(&until, false)?))
    }
}

fn local_to_utc(naive: &NaiveDateTime, earliest: bool) -> Result<DateTime<Utc>> {
    resolve_local(naive, earliest, |dt| {
        Local.from_local_datetime(dt).map(|local| local.with_timezone(&Utc))
    })
    .ok_or_else(|| ReportError::InvalidDate(format!("{naive} does not exist in the local timezone")))
}

/// Steps a DST gap is searched in, in each direction.
const GAP_STEP_MINUTES: i64 = 15;
const GAP_MAX_STEPS: i64 = 4 * 24;

// Ambiguous times fold toward the wider window. A time inside a DST gap moves
// forward to the first existing instant for a lower bound, back for an upper one.
fn resolve_local<F>(naive: &NaiveDateTime, earliest: bool, lookup: F) -> Option<DateTime<Utc>>
where
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Utc>>,
{
    let step = if earliest {
        Duration::minutes(GAP_STEP_MINUTES)
    } else {
        -Duration::minutes(GAP_STEP_MINUTES)
    };

    let mut candidate = *naive;
    for _ in 0..=GAP_MAX_STEPS {
        match lookup(&candidate) {
            LocalResult::Single(dt) => return Some(dt),
            LocalResult::Ambiguous(a, b) => return Some(if earliest { a.min(b) } else { a.max(b) }),
            LocalResult::None => candidate = candidate.checked_add_signed(step)?,
        }
    }
    None
}

pub fn parse_weekday(input: &str) -> Result<Weekday> {
    input
        .trim()
        .parse::<Weekday>()
        .map_err(|_| ReportError::Config(format!("Unknown weekday '{input}'")))
}
