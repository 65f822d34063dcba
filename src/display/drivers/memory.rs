/*
 *  display/drivers/memory.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory display driver for the simulator and tests
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

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, Mutex};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

/// Display driver backed by a plain framebuffer.
///
/// Records driver calls so tests can check how the face drove the panel,
/// and can write the flushed frame out as a PPM image.
#[derive(Debug, Clone)]
pub struct MemoryDriver {
    /// Frame the face paints into
    framebuffer: VarFrameBuf<Rgb888>,

    capabilities: DisplayCapabilities,

    /// Counters, shared so a test can keep a handle after moving the driver
    state: Arc<Mutex<MemoryDriverState>>,
}

/// What the driver has been asked to do so far
#[derive(Debug, Default)]
pub struct MemoryDriverState {
    pub init_count: usize,

    /// Frames pushed
    pub flush_count: usize,

    pub clear_count: usize,

    /// Set by `init`; `flush` refuses to run without it
    pub is_initialized: bool,

    /// Make the next flushes fail
    pub simulate_flush_failure: bool,
}

impl MemoryDriver {
    pub fn new(width: u32, height: u32, color_depth: ColorDepth) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "display size {}x{} must be non-zero",
                width, height
            )));
        }

        Ok(Self {
            framebuffer: VarFrameBuf::new(width, height, Rgb888::BLACK),
            capabilities: DisplayCapabilities { width, height, color_depth },
            state: Arc::new(Mutex::new(MemoryDriverState::default())),
        })
    }

    pub fn framebuffer(&self) -> &VarFrameBuf<Rgb888> {
        &self.framebuffer
    }

    /// Get pixel at position
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.framebuffer.pixel(Point::new(x, y))
    }

    /// Get reference to state for inspection
    pub fn state(&self) -> Arc<Mutex<MemoryDriverState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryDriverState>, DisplayError> {
        self.state
            .lock()
            .map_err(|_| DisplayError::Other("driver state poisoned".to_string()))
    }

    /// Write the current frame as a binary PPM
    pub fn save_to_ppm(&self, path: &Path) -> Result<(), DisplayError> {
        let file = File::create(path)?;
        self.framebuffer.write_ppm(BufWriter::new(file))?;
        Ok(())
    }
}

impl DisplayDriver for MemoryDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock()?;
        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock()?;

        if !state.is_initialized {
            return Err(DisplayError::NotInitialized);
        }
        if state.simulate_flush_failure {
            return Err(DisplayError::Other("Simulated flush failure".to_string()));
        }

        state.flush_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock()?;
            state.clear_count += 1;
        }

        self.framebuffer.clear(Rgb888::BLACK).ok();
        self.flush()
    }
}

impl DrawTarget for MemoryDriver {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.fill_solid(area, color)
    }
}

impl OriginDimensions for MemoryDriver {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
