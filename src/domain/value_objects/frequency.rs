use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use super::time_period::TimePeriod;

/// Errors raised by frequency construction and calendar math
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyError {
    /// Construction or mutation argument out of range
    Validation(String),
    /// `times` called with an end time before the start time
    EndBeforeStart,
    /// No occurrence found within the one-year forward scan
    NoUpcoming,
    /// Occurrence math for this period has not been built yet
    Unimplemented(TimePeriod),
}

impl fmt::Display for FrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrequencyError::Validation(msg) => write!(f, "invalid frequency: {msg}"),
            FrequencyError::EndBeforeStart => write!(f, "end time is before start time"),
            FrequencyError::NoUpcoming => {
                write!(f, "no upcoming occurrence within the next year")
            }
            FrequencyError::Unimplemented(period) => {
                write!(f, "{period} period occurrence math is not implemented")
            }
        }
    }
}

impl Error for FrequencyError {}

/// Declarative recurrence rule: a calendar period, an interval/offset phase
/// over that period, and the wall-clock fields an occurrence fires at.
///
/// Only the `Hour` period computes occurrences; the other periods validate
/// their inputs but `times`/`next` return
/// [`FrequencyError::Unimplemented`] for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    time_period: TimePeriod,
    interval: u32,
    offset: u32,
    at_minutes: Vec<u8>,
    at_hours: Vec<u8>,
    on_days_of_week: Vec<Weekday>,
    on_days_of_month: Vec<u8>,
}

impl Frequency {
    /// Fires every `interval` hours at each minute in `at_minutes`
    pub fn new_hour(at_minutes: Vec<u8>) -> Result<Self, FrequencyError> {
        validate_minutes(&at_minutes)?;
        Ok(Self {
            time_period: TimePeriod::Hour,
            interval: 1,
            offset: 0,
            at_minutes,
            at_hours: Vec::new(),
            on_days_of_week: Vec::new(),
            on_days_of_month: Vec::new(),
        })
    }

    pub fn new_day(at_minutes: Vec<u8>, at_hours: Vec<u8>) -> Result<Self, FrequencyError> {
        validate_minutes(&at_minutes)?;
        validate_hours(&at_hours)?;
        Ok(Self {
            time_period: TimePeriod::Day,
            interval: 1,
            offset: 0,
            at_minutes,
            at_hours,
            on_days_of_week: Vec::new(),
            on_days_of_month: Vec::new(),
        })
    }

    pub fn new_week(
        at_minutes: Vec<u8>,
        at_hours: Vec<u8>,
        on_days_of_week: Vec<Weekday>,
    ) -> Result<Self, FrequencyError> {
        validate_minutes(&at_minutes)?;
        validate_hours(&at_hours)?;
        Ok(Self {
            time_period: TimePeriod::Week,
            interval: 1,
            offset: 0,
            at_minutes,
            at_hours,
            on_days_of_week,
            on_days_of_month: Vec::new(),
        })
    }

    pub fn new_month(
        at_minutes: Vec<u8>,
        at_hours: Vec<u8>,
        on_days_of_month: Vec<u8>,
    ) -> Result<Self, FrequencyError> {
        validate_minutes(&at_minutes)?;
        validate_hours(&at_hours)?;
        validate_days_of_month(&on_days_of_month)?;
        Ok(Self {
            time_period: TimePeriod::Month,
            interval: 1,
            offset: 0,
            at_minutes,
            at_hours,
            on_days_of_week: Vec::new(),
            on_days_of_month,
        })
    }

    /// Rehydrates a frequency from stored fields under the same validation
    /// as the smart constructors
    #[allow(clippy::too_many_arguments)]
    pub fn new_raw(
        offset: u32,
        interval: u32,
        time_period: TimePeriod,
        at_minutes: Vec<u8>,
        at_hours: Vec<u8>,
        on_days_of_week: Vec<Weekday>,
        on_days_of_month: Vec<u8>,
    ) -> Result<Self, FrequencyError> {
        if interval < 1 {
            return Err(FrequencyError::Validation(
                "interval must be greater than 0".to_string(),
            ));
        }
        validate_minutes(&at_minutes)?;
        validate_hours(&at_hours)?;
        validate_days_of_month(&on_days_of_month)?;
        Ok(Self {
            time_period,
            interval,
            offset,
            at_minutes,
            at_hours,
            on_days_of_week,
            on_days_of_month,
        })
    }

    pub fn time_period(&self) -> TimePeriod {
        self.time_period
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn at_minutes(&self) -> &[u8] {
        &self.at_minutes
    }

    pub fn at_hours(&self) -> &[u8] {
        &self.at_hours
    }

    pub fn on_days_of_week(&self) -> &[Weekday] {
        &self.on_days_of_week
    }

    pub fn on_days_of_month(&self) -> &[u8] {
        &self.on_days_of_month
    }

    /// Sets the number of periods between occurrences
    pub fn set_interval(&mut self, interval: u32) -> Result<(), FrequencyError> {
        if interval < 1 {
            return Err(FrequencyError::Validation(format!(
                "interval {interval} must be greater than 0"
            )));
        }
        self.interval = interval;
        Ok(())
    }

    /// Shifts the interval phase away from its base anchor (midnight for the
    /// Hour period). Negative offsets are unrepresentable.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Every qualifying instant in `[start, end]` inclusive, ascending.
    /// Wall-clock fields are interpreted in `start`'s zone.
    pub fn times<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Vec<DateTime<Tz>>, FrequencyError> {
        if end < start {
            return Err(FrequencyError::EndBeforeStart);
        }
        match self.time_period {
            TimePeriod::Hour => Ok(self.hour_times(start, end)),
            period => Err(FrequencyError::Unimplemented(period)),
        }
    }

    /// Earliest instant strictly after `after` satisfying the rule, scanning
    /// at most one year forward
    pub fn next<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Result<DateTime<Tz>, FrequencyError> {
        match self.time_period {
            TimePeriod::Hour => self.next_hour_time(after).ok_or(FrequencyError::NoUpcoming),
            period => Err(FrequencyError::Unimplemented(period)),
        }
    }

    fn hour_times<Tz: TimeZone>(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> Vec<DateTime<Tz>> {
        let interval = i64::from(self.interval);
        let span_hours = end.clone().signed_duration_since(start.clone()).num_hours();
        let max_slots = (span_hours / interval) + 1;

        let minutes = self.sorted_minutes();
        let tz = start.timezone();
        let day_start = start.date_naive().and_time(NaiveTime::MIN);
        let mut hour = first_slot_hour(start.hour(), self.interval, self.offset);

        let mut times = Vec::new();
        for _ in 0..=max_slots {
            for &minute in &minutes {
                let naive = day_start + Duration::hours(hour) + Duration::minutes(i64::from(minute));
                let Some(candidate) = tz.from_local_datetime(&naive).earliest() else {
                    // wall-clock instant skipped by a DST gap
                    continue;
                };
                if candidate < *start {
                    continue;
                }
                if candidate > *end {
                    return times;
                }
                times.push(candidate);
            }
            hour += interval;
        }
        times
    }

    fn next_hour_time<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let interval = i64::from(self.interval);
        let max_slots = (365 * 24) / interval;

        let minutes = self.sorted_minutes();
        let tz = after.timezone();
        let day_start = after.date_naive().and_time(NaiveTime::MIN);
        let mut hour = first_slot_hour(after.hour(), self.interval, self.offset);

        for _ in 0..=max_slots {
            for &minute in &minutes {
                let naive = day_start + Duration::hours(hour) + Duration::minutes(i64::from(minute));
                let Some(candidate) = tz.from_local_datetime(&naive).earliest() else {
                    continue;
                };
                if candidate > *after {
                    return Some(candidate);
                }
            }
            hour += interval;
        }
        None
    }

    fn sorted_minutes(&self) -> Vec<u8> {
        let mut minutes = self.at_minutes.clone();
        minutes.sort_unstable();
        minutes.dedup();
        minutes
    }
}

/// First hour slot to scan from: the start hour rounded down to the nearest
/// interval multiple, shifted by the phase offset. Candidates falling before
/// the range start are skipped by the caller.
fn first_slot_hour(start_hour: u32, interval: u32, offset: u32) -> i64 {
    i64::from(start_hour - (start_hour % interval)) + i64::from(offset)
}

fn validate_minutes(minutes: &[u8]) -> Result<(), FrequencyError> {
    for &minute in minutes {
        if minute > 59 {
            return Err(FrequencyError::Validation(format!(
                "minute {minute} must be between 0 and 59, inclusive"
            )));
        }
    }
    Ok(())
}

fn validate_hours(hours: &[u8]) -> Result<(), FrequencyError> {
    for &hour in hours {
        if hour > 23 {
            return Err(FrequencyError::Validation(format!(
                "hour {hour} must be between 0 and 23, inclusive"
            )));
        }
    }
    Ok(())
}

fn validate_days_of_month(days: &[u8]) -> Result<(), FrequencyError> {
    for &day in days {
        if day < 1 || day > 31 {
            return Err(FrequencyError::Validation(format!(
                "day of month {day} must be between 1 and 31, inclusive"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn new_hour_accepts_valid_minutes() {
        let f = Frequency::new_hour(vec![0, 1, 59]).unwrap();
        assert_eq!(f.time_period(), TimePeriod::Hour);
        assert_eq!(f.interval(), 1);
        assert_eq!(f.offset(), 0);
        assert_eq!(f.at_minutes(), &[0, 1, 59]);
    }

    #[test]
    fn new_hour_rejects_minute_60() {
        assert!(matches!(
            Frequency::new_hour(vec![0, 1, 60]),
            Err(FrequencyError::Validation(_))
        ));
    }

    #[test]
    fn new_day_rejects_hour_24() {
        assert!(matches!(
            Frequency::new_day(vec![0], vec![0, 23, 24]),
            Err(FrequencyError::Validation(_))
        ));
    }

    #[test]
    fn new_month_rejects_out_of_range_days() {
        assert!(Frequency::new_month(vec![0], vec![0], vec![0]).is_err());
        assert!(Frequency::new_month(vec![0], vec![0], vec![32]).is_err());
        assert!(Frequency::new_month(vec![0], vec![0], vec![1, 31]).is_ok());
    }

    #[test]
    fn new_raw_rejects_zero_interval() {
        let err = Frequency::new_raw(0, 0, TimePeriod::Hour, vec![0], vec![], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, FrequencyError::Validation(_)));
    }

    #[test]
    fn set_interval_rejects_zero() {
        let mut f = Frequency::new_hour(vec![0]).unwrap();
        assert!(f.set_interval(0).is_err());
        f.set_interval(4).unwrap();
        assert_eq!(f.interval(), 4);
    }

    #[test]
    fn times_errors_when_end_before_start() {
        let f = Frequency::new_hour(vec![0]).unwrap();
        let start = utc(2000, 1, 1, 12, 0);
        let end = utc(2000, 1, 1, 11, 0);
        assert_eq!(f.times(&start, &end), Err(FrequencyError::EndBeforeStart));
    }

    #[test]
    fn times_point_range_hits_only_matching_minute() {
        let f = Frequency::new_hour(vec![0]).unwrap();

        let on_the_hour = utc(2000, 1, 1, 12, 0);
        assert_eq!(f.times(&on_the_hour, &on_the_hour).unwrap(), vec![on_the_hour]);

        let off_the_hour = utc(2000, 1, 1, 12, 30);
        assert!(f.times(&off_the_hour, &off_the_hour).unwrap().is_empty());
    }

    #[test]
    fn times_returns_ascending_in_range_occurrences() {
        let f = Frequency::new_hour(vec![45, 15]).unwrap();
        let start = utc(2000, 1, 1, 12, 30);
        let end = utc(2000, 1, 1, 14, 30);

        let times = f.times(&start, &end).unwrap();
        assert_eq!(
            times,
            vec![
                utc(2000, 1, 1, 12, 45),
                utc(2000, 1, 1, 13, 15),
                utc(2000, 1, 1, 13, 45),
                utc(2000, 1, 1, 14, 15),
            ]
        );
        for t in &times {
            assert!(*t >= start && *t <= end);
        }
    }

    #[test]
    fn times_spans_day_boundary() {
        let f = Frequency::new_hour(vec![30]).unwrap();
        let start = utc(2000, 1, 1, 23, 0);
        let end = utc(2000, 1, 2, 0, 59);
        assert_eq!(
            f.times(&start, &end).unwrap(),
            vec![utc(2000, 1, 1, 23, 30), utc(2000, 1, 2, 0, 30)]
        );
    }

    #[test]
    fn interval_phase_is_anchored_to_midnight() {
        let mut f = Frequency::new_hour(vec![0]).unwrap();
        f.set_interval(2);

        // start inside an odd hour: only even hours fire
        let start = utc(2000, 1, 1, 13, 0);
        let end = utc(2000, 1, 1, 17, 0);
        assert_eq!(
            f.times(&start, &end).unwrap(),
            vec![utc(2000, 1, 1, 14, 0), utc(2000, 1, 1, 16, 0)]
        );
    }

    #[test]
    fn offset_shifts_the_interval_phase() {
        let mut f = Frequency::new_hour(vec![0]).unwrap();
        f.set_interval(4);
        f.set_offset(1);

        // hours congruent to 1 mod 4
        let start = utc(2000, 1, 1, 7, 30);
        let end = utc(2000, 1, 1, 14, 0);
        assert_eq!(
            f.times(&start, &end).unwrap(),
            vec![utc(2000, 1, 1, 9, 0), utc(2000, 1, 1, 13, 0)]
        );
    }

    #[test]
    fn times_with_no_minutes_never_fires() {
        let f = Frequency::new_hour(vec![]).unwrap();
        let start = utc(2000, 1, 1, 0, 0);
        let end = utc(2000, 1, 2, 0, 0);
        assert!(f.times(&start, &end).unwrap().is_empty());
    }

    #[test]
    fn times_uses_the_start_zone_for_wall_clock_fields() {
        use chrono_tz::America::New_York;

        let f = Frequency::new_hour(vec![0]).unwrap();
        let start = New_York.with_ymd_and_hms(2000, 6, 1, 9, 30, 0).unwrap();
        let end = New_York.with_ymd_and_hms(2000, 6, 1, 10, 30, 0).unwrap();

        let times = f.times(&start, &end).unwrap();
        assert_eq!(
            times,
            vec![New_York.with_ymd_and_hms(2000, 6, 1, 10, 0, 0).unwrap()]
        );
    }

    #[test]
    fn next_is_strictly_after() {
        let f = Frequency::new_hour(vec![0, 30]).unwrap();

        let at_occurrence = utc(2000, 1, 1, 12, 30);
        assert_eq!(f.next(&at_occurrence).unwrap(), utc(2000, 1, 1, 13, 0));

        let just_before = utc(2000, 1, 1, 12, 29);
        assert_eq!(f.next(&just_before).unwrap(), utc(2000, 1, 1, 12, 30));
    }

    #[test]
    fn next_matches_every_element_of_times() {
        let f = Frequency::new_hour(vec![10, 40]).unwrap();
        let start = utc(2000, 1, 1, 6, 0);
        let end = utc(2000, 1, 1, 9, 0);

        for t in f.times(&start, &end).unwrap() {
            let just_before = t - Duration::seconds(1);
            assert_eq!(f.next(&just_before).unwrap(), t);
        }
    }

    #[test]
    fn next_errors_when_nothing_fires_within_a_year() {
        let f = Frequency::new_hour(vec![]).unwrap();
        assert_eq!(
            f.next(&utc(2000, 1, 1, 0, 0)),
            Err(FrequencyError::NoUpcoming)
        );
    }

    #[test]
    fn unimplemented_periods_validate_but_do_not_compute() {
        let day = Frequency::new_day(vec![0], vec![9]).unwrap();
        let week = Frequency::new_week(vec![0], vec![9], vec![Weekday::Mon]).unwrap();
        let month = Frequency::new_month(vec![0], vec![9], vec![1]).unwrap();

        let start = utc(2000, 1, 1, 0, 0);
        let end = utc(2000, 2, 1, 0, 0);
        for f in [day, week, month] {
            assert!(matches!(
                f.times(&start, &end),
                Err(FrequencyError::Unimplemented(_))
            ));
            assert!(matches!(
                f.next(&start),
                Err(FrequencyError::Unimplemented(_))
            ));
        }
    }
}
