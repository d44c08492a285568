//! The single simulated instant shared by the whole scene

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Timer ticks follow wall-clock time
    RealTime,
    /// Pinned by the user; timer ticks are ignored
    Scrubbed,
}

#[derive(Debug, Clone)]
pub struct SimulatedClock {
    mode: ClockMode,
    current_time: satkit::Instant,
}

impl SimulatedClock {
    /// Start at current UTC time
    pub fn realtime() -> Self {
        let current_time = instant_from_utc(&Utc::now())
            .unwrap_or_else(|| satkit::Instant::new(0));
        Self {
            mode: ClockMode::RealTime,
            current_time,
        }
    }

    pub fn scrubbed(at: satkit::Instant) -> Self {
        Self {
            mode: ClockMode::Scrubbed,
            current_time: at,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn current_time(&self) -> &satkit::Instant {
        &self.current_time
    }

    /// Fixed-interval timer fired. Returns the instant to tick with, or
    /// `None` while scrubbed.
    pub fn on_timer(&mut self) -> Option<satkit::Instant> {
        self.on_timer_at(&Utc::now())
    }

    pub fn on_timer_at(&mut self, wall: &DateTime<Utc>) -> Option<satkit::Instant> {
        match self.mode {
            ClockMode::Scrubbed => None,
            ClockMode::RealTime => {
                match instant_from_utc(wall) {
                    Some(instant) => self.current_time = instant,
                    None => log::warn!("Wall clock {} not representable, holding time", wall),
                }
                Some(self.current_time)
            }
        }
    }

    /// Pin the clock to a user-chosen instant
    pub fn scrub(&mut self, at: satkit::Instant) -> satkit::Instant {
        self.mode = ClockMode::Scrubbed;
        self.current_time = at;
        at
    }

    pub fn resume_realtime(&mut self) -> satkit::Instant {
        self.mode = ClockMode::RealTime;
        self.on_timer_at(&Utc::now());
        self.current_time
    }

    /// Format current time as string
    pub fn format_time(&self) -> String {
        format_instant(&self.current_time)
    }
}

pub fn instant_from_utc(t: &DateTime<Utc>) -> Option<satkit::Instant> {
    let seconds = t.second() as f64 + t.nanosecond() as f64 * 1e-9;
    satkit::Instant::from_datetime(
        t.year(),
        t.month() as i32,
        t.day() as i32,
        t.hour() as i32,
        t.minute() as i32,
        seconds,
    )
    .ok()
}

pub fn format_instant(instant: &satkit::Instant) -> String {
    let (year, month, day, hour, min, sec) = instant.as_datetime();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, month, day, hour, min, sec as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wall(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_realtime_follows_wall_clock() {
        let mut clock = SimulatedClock::realtime();
        let ticked = clock.on_timer_at(&wall(12, 0)).unwrap();
        assert_eq!(format_instant(&ticked), "2024-04-10 12:00:00 UTC");
        assert_eq!(clock.format_time(), "2024-04-10 12:00:00 UTC");
    }

    #[test]
    fn test_scrub_pins_time_until_resumed() {
        let mut clock = SimulatedClock::realtime();
        let pinned = instant_from_utc(&wall(6, 30)).unwrap();
        clock.scrub(pinned);
        assert_eq!(clock.mode(), ClockMode::Scrubbed);

        assert!(clock.on_timer_at(&wall(12, 0)).is_none());
        assert_eq!(clock.format_time(), "2024-04-10 06:30:00 UTC");

        clock.resume_realtime();
        assert_eq!(clock.mode(), ClockMode::RealTime);
        assert!(clock.on_timer_at(&wall(12, 0)).is_some());
        assert_eq!(clock.format_time(), "2024-04-10 12:00:00 UTC");
    }

    #[test]
    fn test_scrubbed_constructor() {
        let at = instant_from_utc(&wall(1, 2)).unwrap();
        let clock = SimulatedClock::scrubbed(at);
        assert_eq!(clock.mode(), ClockMode::Scrubbed);
        assert_eq!(clock.format_time(), "2024-04-10 01:02:00 UTC");
    }
}
