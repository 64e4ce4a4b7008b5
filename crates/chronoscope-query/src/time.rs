//! ISO-8601 instants and durations as used in query parameters.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Parse an instant. Accepts RFC 3339, a date-time without offset (read as
/// UTC) and a bare date (midnight UTC).
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A `PnYnMnWnDTnHnMnS` duration. Years and months are calendar units and
/// must be whole; the other components may carry a fraction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IsoDuration {
    pub years: u32,
    pub months: u32,
    pub weeks: f64,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl IsoDuration {
    pub fn parse(input: &str) -> Result<Self, String> {
        let body = input
            .strip_prefix('P')
            .ok_or_else(|| format!("'{}' does not start with P", input))?;
        let (date, time) = match body.split_once('T') {
            Some((_, "")) => return Err(format!("'{}' has an empty time part", input)),
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut duration = IsoDuration::default();
        let mut last: Option<Unit> = None;
        let mut seen_any = false;

        for (part, in_time) in [(date, false), (time.unwrap_or_default(), true)] {
            let mut number = String::new();
            for c in part.chars() {
                if c.is_ascii_digit() || c == '.' || c == ',' {
                    number.push(if c == ',' { '.' } else { c });
                    continue;
                }
                let unit = match (c, in_time) {
                    ('Y', false) => Unit::Years,
                    ('M', false) => Unit::Months,
                    ('W', false) => Unit::Weeks,
                    ('D', false) => Unit::Days,
                    ('H', true) => Unit::Hours,
                    ('M', true) => Unit::Minutes,
                    ('S', true) => Unit::Seconds,
                    _ => return Err(format!("unexpected '{}' in '{}'", c, input)),
                };
                if last.is_some_and(|prev| prev >= unit) {
                    return Err(format!("components out of order in '{}'", input));
                }
                let amount: f64 = number
                    .parse()
                    .map_err(|_| format!("missing or bad number before '{}' in '{}'", c, input))?;
                duration.set(unit, amount, input)?;
                number.clear();
                last = Some(unit);
                seen_any = true;
            }
            if !number.is_empty() {
                return Err(format!("trailing number without designator in '{}'", input));
            }
        }

        if !seen_any {
            return Err(format!("'{}' has no components", input));
        }
        Ok(duration)
    }

    fn set(&mut self, unit: Unit, amount: f64, input: &str) -> Result<(), String> {
        let whole = |amount: f64| -> Result<u32, String> {
            if amount.fract() != 0.0 || amount > u32::MAX as f64 {
                Err(format!("years and months must be whole numbers in '{}'", input))
            } else {
                Ok(amount as u32)
            }
        };
        match unit {
            Unit::Years => self.years = whole(amount)?,
            Unit::Months => self.months = whole(amount)?,
            Unit::Weeks => self.weeks = amount,
            Unit::Days => self.days = amount,
            Unit::Hours => self.hours = amount,
            Unit::Minutes => self.minutes = amount,
            Unit::Seconds => self.seconds = amount,
        }
        Ok(())
    }

    /// Length of this duration when laid out forward from `anchor`.
    pub fn span_from(&self, anchor: DateTime<Utc>) -> Option<TimeDelta> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let end = anchor.checked_add_months(Months::new(months))?;
        let seconds = self.weeks * 604_800.0
            + self.days * 86_400.0
            + self.hours * 3_600.0
            + self.minutes * 60.0
            + self.seconds;
        let millis = (seconds * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let end = end.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)?;
        Some(end - anchor)
    }

    /// The instant this duration before `now`.
    pub fn before(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_signed(self.span_from(now)?)
    }
}
