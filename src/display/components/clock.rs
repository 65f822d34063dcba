/*
 *  display/components/clock.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Digital clock - two character hour/minute/month/day strings
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use arrayvec::ArrayString;
use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};
use std::time::Duration;

/// Two character label text, stack allocated
pub type Digits = ArrayString<2>;

/// Wall-clock fields the face cares about, sampled once per repaint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub month: u32,
    pub day: u32,
}

impl From<&NaiveDateTime> for ClockReading {
    fn from(t: &NaiveDateTime) -> Self {
        Self {
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
            month: t.month(),
            day: t.day(),
        }
    }
}

/// One repaint's view of time.
///
/// The seconds ring follows the actual second while the digits are formatted
/// from a time slightly ahead, so a minute rollover shows on the digits in the
/// same frame the ring empties. The two reads must stay independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSample {
    /// Drives the seconds ring
    pub ring_second: u32,

    /// Drives the digit and date labels
    pub display: ClockReading,
}

impl TimeSample {
    pub fn take(now: NaiveDateTime, lookahead: Duration) -> Self {
        let ahead = TimeDelta::from_std(lookahead)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);

        Self {
            ring_second: now.second(),
            display: ClockReading::from(&ahead),
        }
    }
}

/// Formatted label text for one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDigits {
    pub hour: Digits,
    pub minute: Digits,
    pub month: Digits,
    pub day: Digits,
}

impl ClockDigits {
    pub fn format(reading: &ClockReading, hour_24: bool) -> Self {
        let hour = if hour_24 {
            reading.hour
        } else {
            match reading.hour % 12 {
                0 => 12,
                h => h,
            }
        };

        Self {
            hour: two_digits(hour),
            minute: two_digits(reading.minute),
            month: two_digits(reading.month),
            day: two_digits(reading.day),
        }
    }
}

/// Zero padded, always exactly two characters
fn two_digits(value: u32) -> Digits {
    let value = value % 100;
    let mut s = Digits::new();
    s.push(char::from(b'0' + (value / 10) as u8));
    s.push(char::from(b'0' + (value % 10) as u8));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_24h_format() {
        let digits = ClockDigits::format(&ClockReading::from(&at(7, 5, 0)), true);
        assert_eq!(digits.hour.as_str(), "07");
        assert_eq!(digits.minute.as_str(), "05");
        assert_eq!(digits.month.as_str(), "03");
        assert_eq!(digits.day.as_str(), "09");

        let digits = ClockDigits::format(&ClockReading::from(&at(23, 59, 0)), true);
        assert_eq!(digits.hour.as_str(), "23");
    }

    #[test]
    fn test_12h_format() {
        let cases = [(0, "12"), (1, "01"), (9, "09"), (12, "12"), (13, "01"), (23, "11")];
        for (h, expected) in cases {
            let digits = ClockDigits::format(&ClockReading::from(&at(h, 0, 0)), false);
            assert_eq!(digits.hour.as_str(), expected, "hour {}", h);
        }
    }

    #[test]
    fn test_every_field_is_two_chars() {
        for h in 0..24 {
            for hour_24 in [true, false] {
                let digits = ClockDigits::format(&ClockReading::from(&at(h, h * 2, 0)), hour_24);
                assert_eq!(digits.hour.len(), 2);
                assert_eq!(digits.minute.len(), 2);
                assert_eq!(digits.month.len(), 2);
                assert_eq!(digits.day.len(), 2);
            }
        }
    }

    #[test]
    fn test_lookahead_decoupled_from_ring() {
        let sample = TimeSample::take(at(10, 14, 59), Duration::from_secs(1));

        assert_eq!(sample.ring_second, 59);
        assert_eq!(sample.display.minute, 15);
        assert_eq!(sample.display.second, 0);
    }

    #[test]
    fn test_lookahead_rolls_date() {
        let new_year_eve = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let sample = TimeSample::take(new_year_eve, Duration::from_secs(1));
        let digits = ClockDigits::format(&sample.display, true);

        assert_eq!(sample.ring_second, 59);
        assert_eq!(digits.hour.as_str(), "00");
        assert_eq!(digits.month.as_str(), "01");
        assert_eq!(digits.day.as_str(), "01");
    }

    #[test]
    fn test_zero_lookahead() {
        let sample = TimeSample::take(at(8, 30, 12), Duration::ZERO);
        assert_eq!(sample.ring_second, 12);
        assert_eq!(sample.display, ClockReading::from(&at(8, 30, 12)));
    }
}
