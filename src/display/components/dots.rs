/*
 *  display/components/dots.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dot-matrix indicators - the seconds ring and the battery column
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};

/// Spacing between neighbouring dots, both axes
pub const DOT_PITCH: i32 = 12;

/// Radius of the always-present background dots
pub const STATIC_DOT_RADIUS: u32 = 1;

/// Radius of the filled value dots
pub const ACTIVE_DOT_RADIUS: u32 = 4;

/// Bottom-left dot of the seconds ring
pub const RING_ORIGIN: Point = Point::new(12, 156);

/// Dots per full ring row
pub const RING_COLUMNS: i32 = 5;

/// Number of positions in the seconds ring (one per elapsed second, 59 max)
pub const RING_DOTS: usize = 59;

/// Ring index where the rows narrow by one column
const RING_NARROW_AT: usize = 55;

/// Ring index that lifts into the single top dot
const RING_LIFT_AT: usize = 58;

/// Bottom dot of the battery column
pub const BATTERY_ORIGIN: Point = Point::new(77, 156);

/// Number of positions in the battery column
pub const BATTERY_DOTS: usize = 10;

/// Walks the seconds ring layout.
///
/// Rows of five fill left to right, bottom to top. The top of the ring is
/// hand-shaped for the display corner: index 55 starts a narrower three dot
/// row and index 58 jumps up early to a single centred dot.
#[derive(Debug, Clone)]
pub struct RingCursor {
    index: usize,
    pos: Point,
}

impl RingCursor {
    /// A cursor reset to the ring origin
    pub fn new() -> Self {
        Self { index: 0, pos: RING_ORIGIN }
    }
}

impl Default for RingCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for RingCursor {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.index >= RING_DOTS {
            return None;
        }

        if self.index == RING_NARROW_AT {
            self.pos.x = RING_ORIGIN.x + DOT_PITCH;
        }
        if self.index == RING_LIFT_AT {
            self.pos.y -= DOT_PITCH;
            self.pos.x = RING_ORIGIN.x + 2 * DOT_PITCH;
        }

        let here = self.pos;

        self.pos.x += DOT_PITCH;
        if self.pos.x > RING_COLUMNS * DOT_PITCH {
            self.pos.x = RING_ORIGIN.x;
            self.pos.y -= DOT_PITCH;
        }
        self.index += 1;

        Some(here)
    }
}

/// Positions of the battery column, bottom up
pub fn battery_positions() -> impl Iterator<Item = Point> {
    (0..BATTERY_DOTS as i32).map(|i| BATTERY_ORIGIN - Point::new(0, i * DOT_PITCH))
}

/// Active dots for an elapsed-seconds value (0 draws none)
pub fn ring_dots(second: u32) -> usize {
    (second as usize).min(RING_DOTS)
}

/// Active dots for a battery percentage.
///
/// One dot per full ten percent, but never fewer than one so a nearly flat
/// battery still shows something.
pub fn battery_dots(percent: u8) -> usize {
    (percent.min(100) as usize / 10).max(1)
}

fn dot<D>(target: &mut D, center: Point, radius: u32, color: D::Color) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    Circle::with_center(center, radius * 2 + 1)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
}

/// Static background: the 59 ring dots and 10 battery dots at small radius
pub fn draw_static_dots<D>(target: &mut D, ring: D::Color, battery: D::Color) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    for center in RingCursor::new() {
        dot(target, center, STATIC_DOT_RADIUS, ring)?;
    }
    for center in battery_positions() {
        dot(target, center, STATIC_DOT_RADIUS, battery)?;
    }
    Ok(())
}

/// Fill the seconds ring up to `second`
pub fn draw_seconds<D>(target: &mut D, second: u32, color: D::Color) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    for center in RingCursor::new().take(ring_dots(second)) {
        dot(target, center, ACTIVE_DOT_RADIUS, color)?;
    }
    Ok(())
}

/// Fill the battery column for `percent`
pub fn draw_battery<D>(target: &mut D, percent: u8, color: D::Color) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    for center in battery_positions().take(battery_dots(percent)) {
        dot(target, center, ACTIVE_DOT_RADIUS, color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;
    use embedded_graphics::pixelcolor::BinaryColor;
    use std::collections::HashSet;

    #[test]
    fn test_ring_has_59_distinct_positions() {
        let positions: Vec<Point> = RingCursor::new().collect();
        assert_eq!(positions.len(), RING_DOTS);

        let unique: HashSet<(i32, i32)> = positions.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(unique.len(), RING_DOTS);
    }

    #[test]
    fn test_ring_regular_rows() {
        let positions: Vec<Point> = RingCursor::new().collect();

        assert_eq!(positions[0], Point::new(12, 156));
        assert_eq!(positions[4], Point::new(60, 156));
        assert_eq!(positions[5], Point::new(12, 144));
        assert_eq!(positions[54], Point::new(60, 36));
    }

    #[test]
    fn test_ring_breakpoints() {
        let positions: Vec<Point> = RingCursor::new().collect();

        // narrowed row of three
        assert_eq!(positions[55], Point::new(24, 24));
        assert_eq!(positions[56], Point::new(36, 24));
        assert_eq!(positions[57], Point::new(48, 24));

        // early lift to the single top dot
        assert_eq!(positions[58], Point::new(36, 12));
    }

    #[test]
    fn test_fresh_cursor_restarts_at_origin() {
        let mut cursor = RingCursor::new();
        cursor.by_ref().take(30).for_each(drop);

        assert_eq!(RingCursor::new().next(), Some(RING_ORIGIN));
    }

    #[test]
    fn test_ring_dot_counts() {
        assert_eq!(ring_dots(0), 0);
        for s in 0..59 {
            assert_eq!(ring_dots(s), s as usize);
        }
        assert_eq!(ring_dots(59), 59);
        assert_eq!(ring_dots(60), 59);
    }

    #[test]
    fn test_battery_floor_rule() {
        for p in 0..10 {
            assert_eq!(battery_dots(p), 1, "percent {}", p);
        }
        assert_eq!(battery_dots(10), 1);
        assert_eq!(battery_dots(19), 1);
        assert_eq!(battery_dots(20), 2);
        assert_eq!(battery_dots(55), 5);
        assert_eq!(battery_dots(99), 9);
        assert_eq!(battery_dots(100), 10);
        assert_eq!(battery_dots(250), 10);
    }

    #[test]
    fn test_battery_column() {
        let positions: Vec<Point> = battery_positions().collect();
        assert_eq!(positions.len(), BATTERY_DOTS);
        assert_eq!(positions[0], Point::new(77, 156));
        assert_eq!(positions[9], Point::new(77, 48));
    }

    #[test]
    fn test_draw_seconds_fills_only_elapsed_dots() {
        let mut fb = VarFrameBuf::new(144, 168, BinaryColor::Off);
        draw_seconds(&mut fb, 10, BinaryColor::On).unwrap();

        // tenth dot (index 9) is large
        assert_eq!(fb.pixel(Point::new(60 + 3, 144)), Some(BinaryColor::On));
        // eleventh position untouched
        assert_eq!(fb.pixel(Point::new(12, 132)), Some(BinaryColor::Off));
    }

    #[test]
    fn test_full_ring_lights_the_breakpoints() {
        let mut fb = VarFrameBuf::new(144, 168, BinaryColor::Off);
        draw_seconds(&mut fb, 59, BinaryColor::On).unwrap();

        for center in [Point::new(24, 24), Point::new(48, 24), Point::new(36, 12)] {
            assert_eq!(fb.pixel(center + Point::new(3, 0)), Some(BinaryColor::On), "{:?}", center);
        }
        // the corners the breaks skip stay dark
        assert_eq!(fb.pixel(Point::new(12, 24)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(60, 24)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(12, 12)), Some(BinaryColor::Off));
    }

    #[test]
    fn test_draw_seconds_zero_draws_nothing() {
        let mut fb = VarFrameBuf::new(144, 168, BinaryColor::Off);
        draw_seconds(&mut fb, 0, BinaryColor::On).unwrap();
        assert_eq!(fb.count(BinaryColor::On), 0);
    }

    #[test]
    fn test_static_dots_are_small() {
        let mut fb = VarFrameBuf::new(144, 168, BinaryColor::Off);
        draw_static_dots(&mut fb, BinaryColor::On, BinaryColor::On).unwrap();

        assert_eq!(fb.pixel(RING_ORIGIN), Some(BinaryColor::On));
        assert_eq!(fb.pixel(RING_ORIGIN + Point::new(3, 0)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(BATTERY_ORIGIN), Some(BinaryColor::On));
    }

    #[test]
    fn test_draw_battery_empty_still_shows_one() {
        let mut fb = VarFrameBuf::new(144, 168, BinaryColor::Off);
        draw_battery(&mut fb, 0, BinaryColor::On).unwrap();

        assert_eq!(fb.pixel(BATTERY_ORIGIN + Point::new(3, 0)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(77, 144)), Some(BinaryColor::Off));
    }
}
