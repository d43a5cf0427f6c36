//! Drawing surface
//!
//! A 2D region with fixed pixel dimensions. The visualizer only needs to
//! clear it and fill rectangles.

use crate::error::{Result, VisualizerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(VisualizerError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| VisualizerError::InvalidColor(hex.to_string()))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = VisualizerError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// 2D draw target
pub trait DrawSurface {
    /// Width in pixels
    fn width(&self) -> f32;

    /// Height in pixels
    fn height(&self) -> f32;

    /// Reset a rectangle to transparent
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fill a rectangle with a solid colour
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
}

/// In-memory RGBA surface
///
/// Rectangles are clipped to the surface; edges are rounded to the nearest
/// pixel, so a zero-height bar paints nothing.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Number of painted (non-transparent) pixels in one column
    pub fn column_fill(&self, x: u32) -> u32 {
        (0..self.height)
            .filter(|&y| self.pixel(x, y).is_some_and(|c| c.a > 0))
            .count() as u32
    }

    /// Whether every pixel is transparent
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|c| c.a == 0)
    }

    fn span(start: f32, length: f32, limit: u32) -> Option<(usize, usize)> {
        if !start.is_finite() || !length.is_finite() || length <= 0.0 {
            return None;
        }
        let lo = start.round().clamp(0.0, limit as f32) as usize;
        let hi = (start + length).round().clamp(0.0, limit as f32) as usize;
        (lo < hi).then_some((lo, hi))
    }

    fn paint(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let Some((x0, x1)) = Self::span(x, width, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(y, height, self.height) else {
            return;
        };

        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }
}

impl DrawSurface for PixelSurface {
    fn width(&self) -> f32 {
        self.width as f32
    }

    fn height(&self) -> f32 {
        self.height as f32
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.paint(x, y, width, height, Color::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.paint(x, y, width, height, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#f9b5ff").unwrap(), Color::rgb(0xf9, 0xb5, 0xff));
        assert_eq!(Color::from_hex("000000").unwrap(), Color::rgb(0, 0, 0));
        assert_eq!(Color::rgb(0xf9, 0xb5, 0xff).to_hex(), "#f9b5ff");
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn fill_and_clear() {
        let mut surface = PixelSurface::new(10, 10);
        let pink = Color::rgb(0xf9, 0xb5, 0xff);

        surface.fill_rect(2.0, 5.0, 3.0, 5.0, pink);
        assert_eq!(surface.pixel(2, 5), Some(pink));
        assert_eq!(surface.pixel(4, 9), Some(pink));
        assert_eq!(surface.pixel(5, 9), Some(Color::TRANSPARENT));
        assert_eq!(surface.column_fill(3), 5);

        surface.clear_rect(0.0, 0.0, 10.0, 10.0);
        assert!(surface.is_blank());
    }

    #[test]
    fn fills_are_clipped() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_rect(-2.0, -2.0, 100.0, 100.0, Color::rgb(1, 2, 3));
        assert!(surface.pixels().iter().all(|c| *c == Color::rgb(1, 2, 3)));

        // Entirely off-surface and degenerate rects paint nothing
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_rect(10.0, 0.0, 2.0, 2.0, Color::rgb(1, 2, 3));
        surface.fill_rect(0.0, 4.0, 2.0, 0.0, Color::rgb(1, 2, 3));
        surface.fill_rect(0.0, 0.0, f32::NAN, 2.0, Color::rgb(1, 2, 3));
        assert!(surface.is_blank());
    }
}
