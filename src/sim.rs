/*
 *  sim.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Simulated host - virtual clock, one-shot timers, sensors and haptics
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

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::display::traits::{TimerHandle, TimerService, WatchHost};

/// Haptic patterns the face can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Short,
    Double,
}

/// Host stand-in driven by virtual time.
///
/// Wall-clock time is `start + uptime`, and uptime only moves when
/// `advance` is called, so tests are deterministic and the binary can feed
/// it real elapsed time.
#[derive(Debug, Clone)]
pub struct SimHost {
    start: NaiveDateTime,
    uptime: Duration,
    timers: BTreeMap<(Duration, u64), TimerHandle>,
    next_id: u64,
    battery_percent: u8,
    connected: bool,
    hour_24: bool,
    pulses: Vec<Pulse>,
}

impl SimHost {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            uptime: Duration::ZERO,
            timers: BTreeMap::new(),
            next_id: 0,
            battery_percent: 100,
            connected: true,
            hour_24: true,
            pulses: Vec::new(),
        }
    }

    pub fn set_battery_percent(&mut self, percent: u8) {
        self.battery_percent = percent.min(100);
    }

    /// Change the link state without notifying anyone; the caller decides
    /// whether the face hears about it
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_hour_24(&mut self, hour_24: bool) {
        self.hour_24 = hour_24;
    }

    /// Haptic requests so far, oldest first
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Hand over the recorded pulses and start a fresh record
    pub fn take_pulses(&mut self) -> Vec<Pulse> {
        std::mem::take(&mut self.pulses)
    }

    pub fn uptime(&self) -> Duration {
        self.uptime
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Time left until the earliest timer, None when nothing is pending
    pub fn until_next_timer(&self) -> Option<Duration> {
        self.timers
            .keys()
            .next()
            .map(|(deadline, _)| deadline.saturating_sub(self.uptime))
    }

    /// Move virtual time forward
    pub fn advance(&mut self, by: Duration) {
        self.uptime += by;
    }

    /// Take the earliest timer that is due, in registration order for ties
    pub fn pop_due(&mut self) -> Option<TimerHandle> {
        let (&(deadline, _), _) = self.timers.first_key_value()?;
        if deadline > self.uptime {
            return None;
        }
        self.timers.pop_first().map(|(_, handle)| handle)
    }
}

impl Default for SimHost {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(10, 14, 30))
            .unwrap_or_default();
        Self::new(start)
    }
}

impl TimerService for SimHost {
    fn register_timer(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.insert((self.uptime + delay, self.next_id), handle);
        handle
    }
}

impl WatchHost for SimHost {
    fn now(&self) -> NaiveDateTime {
        TimeDelta::from_std(self.uptime)
            .ok()
            .and_then(|d| self.start.checked_add_signed(d))
            .unwrap_or(self.start)
    }

    fn battery_percent(&self) -> u8 {
        self.battery_percent
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_24h_style(&self) -> bool {
        self.hour_24
    }

    fn short_pulse(&mut self) {
        self.pulses.push(Pulse::Short);
    }

    fn double_pulse(&mut self) {
        self.pulses.push(Pulse::Double);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_clock_follows_uptime() {
        let mut host = SimHost::default();
        assert_eq!(host.now().second(), 30);

        host.advance(Duration::from_secs(45));
        assert_eq!(host.now().minute(), 15);
        assert_eq!(host.now().second(), 15);
    }

    #[test]
    fn test_timers_pop_in_deadline_order() {
        let mut host = SimHost::default();
        let late = host.register_timer(Duration::from_secs(2));
        let early = host.register_timer(Duration::from_secs(1));

        assert_eq!(host.until_next_timer(), Some(Duration::from_secs(1)));
        assert_eq!(host.pop_due(), None);

        host.advance(Duration::from_secs(2));
        assert_eq!(host.pop_due(), Some(early));
        assert_eq!(host.pop_due(), Some(late));
        assert_eq!(host.pop_due(), None);
        assert_eq!(host.until_next_timer(), None);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut host = SimHost::default();
        let a = host.register_timer(Duration::ZERO);
        let b = host.register_timer(Duration::ZERO);
        assert_ne!(a, b);
        assert_eq!(host.pending_timers(), 2);
    }

    #[test]
    fn test_take_pulses_drains() {
        let mut host = SimHost::default();
        host.short_pulse();
        host.double_pulse();

        assert_eq!(host.take_pulses(), vec![Pulse::Short, Pulse::Double]);
        assert!(host.pulses().is_empty());

        host.short_pulse();
        assert_eq!(host.pulses(), [Pulse::Short]);
    }

    #[test]
    fn test_battery_is_clamped() {
        let mut host = SimHost::default();
        host.set_battery_percent(180);
        assert_eq!(host.battery_percent(), 100);
    }
}
