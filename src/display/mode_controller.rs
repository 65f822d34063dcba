/*
 *  display/mode_controller.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Reveal controller - shake driven caption/date/time cycle
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

use std::time::Duration;

use crate::display::traits::{TimerHandle, TimerService};

/// Default window in which a second shake fires the reveal
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// Phases of the face, see `PHASES` for the full table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealPhase {
    Normal,      // digits, steady
    BtCaption,   // "NO BT" over the digits
    DateCaption, // "DA TE" over the date
    DateOnly,    // date
    TimeCaption, // "TI ME"
    TimeOnly,    // digits again, steady until the next shake
}

/// What is on screen while in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    /// Caption text for the top and bottom lines, None hides both
    pub caption: Option<(&'static str, &'static str)>,

    /// Hour and minute labels visible
    pub digits: bool,

    /// Month and day labels visible
    pub date: bool,
}

/// Timed exit from a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub hold: Duration,
    pub next: RevealPhase,
}

/// One row of the transition table
#[derive(Debug, Clone, Copy)]
pub struct PhaseEntry {
    pub phase: RevealPhase,
    pub scene: Scene,
    pub exit: Option<Transition>,
}

const fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// Transition table, indexed by `RevealPhase as usize`
pub static PHASES: [PhaseEntry; 6] = [
    PhaseEntry {
        phase: RevealPhase::Normal,
        scene: Scene { caption: None, digits: true, date: false },
        exit: None,
    },
    PhaseEntry {
        phase: RevealPhase::BtCaption,
        scene: Scene { caption: Some(("NO", "BT")), digits: true, date: false },
        exit: Some(Transition { hold: secs(1), next: RevealPhase::Normal }),
    },
    PhaseEntry {
        phase: RevealPhase::DateCaption,
        scene: Scene { caption: Some(("DA", "TE")), digits: true, date: true },
        exit: Some(Transition { hold: secs(1), next: RevealPhase::DateOnly }),
    },
    PhaseEntry {
        phase: RevealPhase::DateOnly,
        scene: Scene { caption: None, digits: true, date: true },
        exit: Some(Transition { hold: secs(2), next: RevealPhase::TimeCaption }),
    },
    PhaseEntry {
        phase: RevealPhase::TimeCaption,
        scene: Scene { caption: Some(("TI", "ME")), digits: false, date: false },
        exit: Some(Transition { hold: secs(1), next: RevealPhase::TimeOnly }),
    },
    PhaseEntry {
        phase: RevealPhase::TimeOnly,
        scene: Scene { caption: None, digits: true, date: false },
        exit: None,
    },
];

impl RevealPhase {
    pub fn entry(self) -> &'static PhaseEntry {
        &PHASES[self as usize]
    }

    pub fn scene(self) -> Scene {
        self.entry().scene
    }

    pub fn exit(self) -> Option<Transition> {
        self.entry().exit
    }

    /// Steady phases wait for a shake; the others are mid-chain
    pub fn is_steady(self) -> bool {
        self.exit().is_none()
    }
}

/// Result of a shake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First shake, waiting for the second
    Armed,

    /// Second shake started a reveal from this phase
    Fired(RevealPhase),

    /// Second shake arrived while a reveal was still running
    Ignored,
}

/// Result of a timer delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The debounce window ran out without a second shake
    DebounceExpired,

    /// The chain moved on to this phase
    Advanced(RevealPhase),

    /// A timer this controller no longer tracks
    Stale,
}

/// Arm/fire state machine behind the reveal sequence.
///
/// Shake input is noisy, so it is treated as an edge pair: the first shake
/// arms a debounce window, a second shake inside the window fires. Only one
/// chain timer is ever tracked, which keeps reveals from overlapping.
#[derive(Debug)]
pub struct RevealController {
    phase: RevealPhase,
    debounce: Duration,
    armed: Option<TimerHandle>,
    step: Option<TimerHandle>,
}

impl RevealController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            phase: RevealPhase::Normal,
            debounce,
            armed: None,
            step: None,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// A reveal chain timer is outstanding
    pub fn is_running(&self) -> bool {
        self.step.is_some()
    }

    /// Handle a shake; `connected` picks which reveal fires
    pub fn on_tap<T: TimerService>(&mut self, timers: &mut T, connected: bool) -> TapOutcome {
        if self.armed.take().is_none() {
            let handle = timers.register_timer(self.debounce);
            self.armed = Some(handle);
            log::debug!("Shake armed for {:?} ({:?})", self.debounce, handle);
            return TapOutcome::Armed;
        }

        if !self.phase.is_steady() {
            log::debug!("Shake fired during {:?}, reveal already running", self.phase);
            return TapOutcome::Ignored;
        }

        let first = if connected {
            RevealPhase::DateCaption
        } else {
            RevealPhase::BtCaption
        };
        log::debug!("Shake fired, bluetooth {}", if connected { "up" } else { "down" });
        self.enter(timers, first);
        TapOutcome::Fired(first)
    }

    /// Handle a timer the host delivered
    pub fn on_timer<T: TimerService>(&mut self, timers: &mut T, handle: TimerHandle) -> TimerOutcome {
        if self.armed == Some(handle) {
            self.armed = None;
            log::debug!("Shake window expired");
            return TimerOutcome::DebounceExpired;
        }

        if self.step != Some(handle) {
            log::debug!("Ignoring stale timer {:?}", handle);
            return TimerOutcome::Stale;
        }
        self.step = None;

        match self.phase.exit() {
            Some(transition) => {
                self.enter(timers, transition.next);
                TimerOutcome::Advanced(transition.next)
            }
            None => TimerOutcome::Stale,
        }
    }

    fn enter<T: TimerService>(&mut self, timers: &mut T, phase: RevealPhase) {
        log::debug!("Reveal phase changed: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.step = phase.exit().map(|t| timers.register_timer(t.hold));
    }
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
