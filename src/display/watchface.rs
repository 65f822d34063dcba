/*
 *  display/watchface.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watchface - wires host ticks, shakes and bluetooth events to the components
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info};

use crate::display::Palette;
use crate::display::components::clock::{ClockDigits, TimeSample};
use crate::display::components::dots;
use crate::display::components::labels::LabelSet;
use crate::display::mode_controller::{
    RevealController, RevealPhase, TapOutcome, TimerOutcome, DEFAULT_DEBOUNCE,
};
use crate::display::traits::{TimerHandle, WatchHost};

/// Digit look-ahead used unless configured otherwise
pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_secs(1);

/// Tunables for a face instance
#[derive(Debug, Clone)]
pub struct FaceConfig {
    /// Colors for every layer
    pub palette: Palette,

    /// Window for the second shake
    pub debounce: Duration,

    /// How far ahead of the ring the digits are formatted
    pub lookahead: Duration,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            debounce: DEFAULT_DEBOUNCE,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// Widgets that only exist between load and unload
#[derive(Debug)]
struct Widgets {
    labels: LabelSet,
    bounds: Size,
}

/// The watchface controller.
///
/// Owns all face state; the host hands itself to each callback, so nothing
/// lives in globals and every event is handled to completion before the next.
#[derive(Debug)]
pub struct Watchface {
    config: FaceConfig,
    widgets: Option<Widgets>,
    reveal: RevealController,
    connected: bool,
    dirty: bool,
}

impl Watchface {
    pub fn new(config: FaceConfig) -> Self {
        let reveal = RevealController::new(config.debounce);
        Self {
            config,
            widgets: None,
            reveal,
            connected: true,
            dirty: false,
        }
    }

    /// Create the widgets and take the initial bluetooth reading
    pub fn on_load<H: WatchHost>(&mut self, host: &mut H, bounds: Size) {
        if self.widgets.is_some() {
            debug!("Watchface already loaded");
            return;
        }

        let mut labels = LabelSet::new();
        labels.apply(&RevealPhase::Normal.scene());
        self.widgets = Some(Widgets { labels, bounds });

        // startup reading, no haptics
        self.connected = host.is_connected();
        self.dirty = true;

        info!(
            "Watchface loaded at {}x{}, bluetooth {}",
            bounds.width,
            bounds.height,
            if self.connected { "connected" } else { "disconnected" }
        );
    }

    /// Drop the widgets and any reveal in flight; later events are ignored
    pub fn on_unload(&mut self) {
        if self.widgets.take().is_some() {
            info!("Watchface unloaded");
        }
        // timers still pending for the old controller arrive as stale
        self.reveal = RevealController::new(self.config.debounce);
        self.dirty = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.widgets.is_some()
    }

    /// Periodic clock tick
    pub fn on_tick(&mut self) {
        if self.is_loaded() {
            self.dirty = true;
        }
    }

    /// Shake gesture
    pub fn on_tap<H: WatchHost>(&mut self, host: &mut H) {
        if !self.is_loaded() {
            debug!("Shake before load ignored");
            return;
        }

        if let TapOutcome::Fired(phase) = self.reveal.on_tap(host, self.connected) {
            self.show(phase);
        }
    }

    /// Bluetooth connectivity change
    pub fn on_bluetooth<H: WatchHost>(&mut self, host: &mut H, connected: bool) {
        if !self.is_loaded() {
            debug!("Bluetooth change before load ignored");
            return;
        }

        if connected {
            host.short_pulse();
            info!("Bluetooth connected");
        } else {
            host.double_pulse();
            info!("Bluetooth disconnected");
        }
        self.connected = connected;
    }

    /// A one-shot timer registered by this face fired
    pub fn on_timer<H: WatchHost>(&mut self, host: &mut H, handle: TimerHandle) {
        if !self.is_loaded() {
            return;
        }

        if let TimerOutcome::Advanced(phase) = self.reveal.on_timer(host, handle) {
            self.show(phase);
        }
    }

    fn show(&mut self, phase: RevealPhase) {
        if let Some(widgets) = self.widgets.as_mut() {
            widgets.labels.apply(&phase.scene());
            self.dirty = true;
        }
    }

    /// Repaint every layer, bottom up
    pub fn render<H, D>(&mut self, host: &H, target: &mut D) -> Result<(), D::Error>
    where
        H: WatchHost,
        D: DrawTarget<Color = Rgb888>,
    {
        let palette = self.config.palette;
        let lookahead = self.config.lookahead;
        let Some(widgets) = self.widgets.as_mut() else {
            return Ok(());
        };

        let sample = TimeSample::take(host.now(), lookahead);
        widgets
            .labels
            .set_digits(&ClockDigits::format(&sample.display, host.is_24h_style()));

        target.fill_solid(
            &Rectangle::new(Point::zero(), widgets.bounds),
            palette.background,
        )?;
        dots::draw_static_dots(target, palette.ring, palette.battery)?;

        widgets.labels.render(target, &palette)?;

        dots::draw_seconds(target, sample.ring_second, palette.ring)?;
        dots::draw_battery(target, host.battery_percent(), palette.battery)?;

        self.dirty = false;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn phase(&self) -> RevealPhase {
        self.reveal.phase()
    }

    pub fn is_armed(&self) -> bool {
        self.reveal.is_armed()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Labels, while loaded
    pub fn labels(&self) -> Option<&LabelSet> {
        self.widgets.as_ref().map(|w| &w.labels)
    }
}
