//! Countdown duration arithmetic.
//!
//! A [`Moment`] is the days/hours/minutes/seconds quadruple being animated.
//! [`Moment::advance`] moves it backward by one second with base-60/60/24
//! carries; days are uncapped. Once the whole duration would go negative it
//! sticks at zero rather than wrapping.

use serde::Serialize;

/// The four countdown time units, in glyph/position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// All units in their fixed order: days, hours, minutes, seconds.
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
    ];

    /// The configuration key for this unit.
    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A countdown moment: the duration still remaining.
///
/// Inputs are not range-validated here; seconds/minutes are conventionally
/// 0-59 and hours 0-23, but the clock only ever mutates through the rollover
/// rule in [`advance`](Moment::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moment {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Moment {
    pub const ZERO: Moment = Moment {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// The value of one unit.
    pub fn part(&self, unit: TimeUnit) -> u32 {
        match unit {
            TimeUnit::Days => self.days,
            TimeUnit::Hours => self.hours,
            TimeUnit::Minutes => self.minutes,
            TimeUnit::Seconds => self.seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Moment::ZERO
    }

    /// Move the duration backward by one second.
    ///
    /// Each carry fires only when the unit below went negative; when days
    /// itself would go negative the countdown floors: all four units reset
    /// to zero and stay there.
    pub fn advance(&self) -> Moment {
        let mut seconds = self.seconds as i64 - 1;
        let mut minutes = self.minutes as i64;
        let mut hours = self.hours as i64;
        let mut days = self.days as i64;

        if seconds < 0 {
            seconds += 60;
            minutes -= 1;

            if minutes < 0 {
                minutes += 60;
                hours -= 1;

                if hours < 0 {
                    hours += 24;
                    days -= 1;

                    if days < 0 {
                        return Moment::ZERO;
                    }
                }
            }
        }

        Moment::new(days as u32, hours as u32, minutes as u32, seconds as u32)
    }

    /// Total seconds remaining, treating each unit at its conventional base.
    pub fn total_seconds(&self) -> u64 {
        self.days as u64 * 86_400
            + self.hours as u64 * 3_600
            + self.minutes as u64 * 60
            + self.seconds as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_decrement() {
        assert_eq!(
            Moment::new(0, 0, 0, 5).advance(),
            Moment::new(0, 0, 0, 4)
        );
    }

    #[test]
    fn test_last_second_reaches_zero() {
        assert_eq!(Moment::new(0, 0, 0, 1).advance(), Moment::ZERO);
    }

    #[test]
    fn test_floor_is_idempotent() {
        assert_eq!(Moment::ZERO.advance(), Moment::ZERO);
        assert_eq!(Moment::ZERO.advance().advance(), Moment::ZERO);
    }

    #[test]
    fn test_minute_rollover() {
        assert_eq!(
            Moment::new(0, 0, 1, 0).advance(),
            Moment::new(0, 0, 0, 59)
        );
    }

    #[test]
    fn test_hour_rollover() {
        assert_eq!(
            Moment::new(0, 1, 0, 0).advance(),
            Moment::new(0, 0, 59, 59)
        );
    }

    #[test]
    fn test_day_rollover() {
        assert_eq!(
            Moment::new(1, 0, 0, 0).advance(),
            Moment::new(0, 23, 59, 59)
        );
    }

    #[test]
    fn test_exhaustion_lands_on_zero_and_sticks() {
        for start in [
            Moment::new(0, 0, 2, 5),
            Moment::new(0, 1, 0, 1),
            Moment::new(1, 0, 0, 0),
        ] {
            let mut m = start;
            for _ in 0..start.total_seconds() {
                assert!(!m.is_zero(), "reached zero early from {start:?}");
                m = m.advance();
            }
            assert_eq!(m, Moment::ZERO, "did not land on zero from {start:?}");
            assert_eq!(m.advance(), Moment::ZERO);
        }
    }

    #[test]
    fn test_part_order_matches_units() {
        let m = Moment::new(1, 2, 3, 4);
        let parts: Vec<u32> = TimeUnit::ALL.iter().map(|u| m.part(*u)).collect();
        assert_eq!(parts, vec![1, 2, 3, 4]);
    }
}
