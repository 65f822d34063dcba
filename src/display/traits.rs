/*
 *  display/traits.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Collaborator traits - the host services and display drivers the watchface runs against
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

use chrono::NaiveDateTime;

use crate::display::error::DisplayError;

/// Opaque token for a one-shot timer registered with the host.
///
/// Handles are never reused by a well-behaved host, so a handle the
/// watchface no longer remembers can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// One-shot timer registration.
///
/// There is no cancel: a path that should stop simply does not
/// re-register, and an unwanted timer is forgotten by its owner.
pub trait TimerService {
    /// Register a timer that fires once after `delay`
    fn register_timer(&mut self, delay: Duration) -> TimerHandle;
}

/// Everything the watchface needs from the host toolkit.
///
/// All calls are infallible by contract; the host delivers every event on a
/// single logic thread so implementations need no interior locking.
pub trait WatchHost: TimerService {
    /// Host-resolved local wall-clock time
    fn now(&self) -> NaiveDateTime;

    /// Battery charge, 0-100
    fn battery_percent(&self) -> u8;

    /// Current bluetooth connection state
    fn is_connected(&self) -> bool;

    /// User preference for 24 hour clock display
    fn is_24h_style(&self) -> bool;

    /// Single short haptic pulse
    fn short_pulse(&mut self);

    /// Two short haptic pulses
    fn double_pulse(&mut self);
}

/// Color depth of the panel the face is rendered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// Black and white panels
    Monochrome,

    /// 24-bit color panels
    Color,
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth (selects the default palette)
    pub color_depth: ColorDepth,
}

/// Minimal panel abstraction the simulator renders through.
///
/// Drawing itself goes through `embedded_graphics::draw_target::DrawTarget`,
/// which is not dyn compatible, so drivers implement it directly.
pub trait DisplayDriver {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Prepare the panel for rendering
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push the current frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Blank the panel
    fn clear(&mut self) -> Result<(), DisplayError>;
}
