/*
 *  display/mod.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watchface display subsystem
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

pub mod components;
pub mod drivers;
pub mod error;
pub mod mode_controller;
pub mod traits;
pub mod watchface;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use serde::{Deserialize, Serialize};

pub use error::DisplayError;
pub use mode_controller::{RevealController, RevealPhase, Scene};
pub use traits::{ColorDepth, DisplayCapabilities, DisplayDriver, TimerHandle, TimerService, WatchHost};
pub use watchface::{FaceConfig, Watchface};

/// Native screen size the layout is tuned for
pub const SCREEN_SIZE: Size = Size::new(144, 168);

/// Selectable palette family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    Color,
    Mono,
}

/// Colors used by every layer of the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb888,
    pub ring: Rgb888,
    pub battery: Rgb888,
    pub text: Rgb888,
}

impl Palette {
    /// Vivid cerulean face with yellow battery dots
    pub const fn color() -> Self {
        Self {
            background: Rgb888::new(0x00, 0xAA, 0xFF),
            ring: Rgb888::WHITE,
            battery: Rgb888::YELLOW,
            text: Rgb888::WHITE,
        }
    }

    /// White on black
    pub const fn mono() -> Self {
        Self {
            background: Rgb888::BLACK,
            ring: Rgb888::WHITE,
            battery: Rgb888::WHITE,
            text: Rgb888::WHITE,
        }
    }

    pub const fn from_kind(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Color => Self::color(),
            PaletteKind::Mono => Self::mono(),
        }
    }

    /// Default palette for a panel
    pub const fn for_depth(depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::Color => Self::color(),
            ColorDepth::Monochrome => Self::mono(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::color()
    }
}
