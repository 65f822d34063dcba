/*
 *  display/components/labels.rs
 *
 *  PlusOne - a dot for every second
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text labels - digits, date and the two caption lines
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

use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::display::Palette;
use crate::display::components::clock::{ClockDigits, Digits};
use crate::display::mode_controller::Scene;

/// Upper label row
pub const TOP_FRAME: Rectangle = Rectangle::new(Point::new(80, 100), Size::new(72, 40));

/// Lower label row
pub const BOTTOM_FRAME: Rectangle = Rectangle::new(Point::new(80, 130), Size::new(72, 40));

/// Vertical inset of the text inside its frame
const TEXT_INSET: i32 = 6;

/// A single two character text label
#[derive(Debug, Clone)]
pub struct Label {
    text: Digits,
    frame: Rectangle,
    hidden: bool,
}

impl Label {
    fn new(frame: Rectangle, placeholder: &str) -> Self {
        let mut label = Self { text: Digits::new(), frame, hidden: false };
        label.set_text(placeholder);
        label
    }

    /// Replace the text, keeping at most two characters
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        for c in text.chars().filter(char::is_ascii).take(self.text.capacity()) {
            self.text.push(c);
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Paint the background box and centred text unless hidden
    pub fn render<D>(&self, target: &mut D, palette: &Palette) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if self.hidden {
            return Ok(());
        }

        self.frame
            .into_styled(PrimitiveStyle::with_fill(palette.background))
            .draw(target)?;

        let character_style = MonoTextStyle::new(&FONT_10X20, palette.text);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        let anchor = Point::new(self.frame.center().x, self.frame.top_left.y + TEXT_INSET);

        Text::with_text_style(self.text.as_str(), anchor, character_style, text_style)
            .draw(target)?;

        Ok(())
    }
}

/// The six labels of the face, in paint order
#[derive(Debug, Clone)]
pub struct LabelSet {
    pub hour: Label,
    pub minute: Label,
    pub month: Label,
    pub day: Label,
    pub caption_top: Label,
    pub caption_bottom: Label,
}

impl LabelSet {
    /// Create all labels with placeholder text so a late first repaint
    /// never shows an empty face
    pub fn new() -> Self {
        Self {
            hour: Label::new(TOP_FRAME, "TI"),
            minute: Label::new(BOTTOM_FRAME, "ME"),
            month: Label::new(TOP_FRAME, "DA"),
            day: Label::new(BOTTOM_FRAME, "TE"),
            caption_top: Label::new(TOP_FRAME, "DA"),
            caption_bottom: Label::new(BOTTOM_FRAME, "TE"),
        }
    }

    /// Push freshly formatted clock text into the digit and date labels
    pub fn set_digits(&mut self, digits: &ClockDigits) {
        self.hour.set_text(&digits.hour);
        self.minute.set_text(&digits.minute);
        self.month.set_text(&digits.month);
        self.day.set_text(&digits.day);
    }

    /// Apply a scene's visibility and caption text.
    ///
    /// A scene without a caption only hides the caption labels; their last
    /// text is kept.
    pub fn apply(&mut self, scene: &Scene) {
        self.hour.set_hidden(!scene.digits);
        self.minute.set_hidden(!scene.digits);
        self.month.set_hidden(!scene.date);
        self.day.set_hidden(!scene.date);

        match scene.caption {
            Some((top, bottom)) => {
                self.caption_top.set_text(top);
                self.caption_bottom.set_text(bottom);
                self.caption_top.set_hidden(false);
                self.caption_bottom.set_hidden(false);
            }
            None => {
                self.caption_top.set_hidden(true);
                self.caption_bottom.set_hidden(true);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        [
            &self.hour,
            &self.minute,
            &self.month,
            &self.day,
            &self.caption_top,
            &self.caption_bottom,
        ]
        .into_iter()
    }

    pub fn render<D>(&self, target: &mut D, palette: &Palette) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        for label in self.iter() {
            label.render(target, palette)?;
        }
        Ok(())
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mode_controller::RevealPhase;
    use crate::vframebuf::VarFrameBuf;

    #[test]
    fn test_placeholders() {
        let labels = LabelSet::new();
        let texts: Vec<&str> = labels.iter().map(Label::text).collect();
        assert_eq!(texts, ["TI", "ME", "DA", "TE", "DA", "TE"]);
    }

    #[test]
    fn test_set_text_truncates() {
        let mut labels = LabelSet::new();
        labels.hour.set_text("123");
        assert_eq!(labels.hour.text(), "12");
    }

    #[test]
    fn test_apply_caption_scene() {
        let mut labels = LabelSet::new();
        labels.apply(&RevealPhase::TimeCaption.scene());

        assert_eq!(labels.caption_top.text(), "TI");
        assert_eq!(labels.caption_bottom.text(), "ME");
        assert!(!labels.caption_top.is_hidden());
        assert!(labels.hour.is_hidden());
        assert!(labels.month.is_hidden());
    }

    #[test]
    fn test_apply_without_caption_keeps_text() {
        let mut labels = LabelSet::new();
        labels.apply(&RevealPhase::BtCaption.scene());
        labels.apply(&RevealPhase::Normal.scene());

        assert!(labels.caption_top.is_hidden());
        assert_eq!(labels.caption_top.text(), "NO");
        assert!(!labels.hour.is_hidden());
        assert!(labels.day.is_hidden());
    }

    #[test]
    fn test_hidden_label_draws_nothing() {
        let palette = Palette::color();
        let mut fb = VarFrameBuf::new(144, 168, Rgb888::BLACK);
        let mut labels = LabelSet::new();
        labels.hour.set_hidden(true);
        labels.hour.render(&mut fb, &palette).unwrap();
        assert_eq!(fb.count(Rgb888::BLACK), 144 * 168);

        labels.hour.set_hidden(false);
        labels.hour.render(&mut fb, &palette).unwrap();
        assert!(fb.count(palette.background) > 0);
        assert!(fb.count(palette.text) > 0);
    }
}
