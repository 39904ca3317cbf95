// SPDX-License-Identifier: MPL-2.0
//! Non-destructive color filter stack.
//!
//! The stack mirrors the CSS filter functions a browser canvas would apply:
//! `brightness`, `contrast`, `saturate`, `blur`, `hue-rotate` and `sepia`,
//! always composed in that order. The order is part of the contract because
//! the operations do not commute.
//!
//! Color math follows the W3C Filter Effects definitions: linear transfer
//! functions for brightness and contrast, the standard luminance matrices for
//! saturation, hue rotation and sepia, and a Gaussian blur whose standard
//! deviation is the blur radius in pixels. Every stage clamps to `[0, 1]`.

use image_rs::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default brightness, contrast and saturation (percent).
pub const NEUTRAL_PERCENT: f32 = 100.0;

/// Adjustable filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Hue,
    Sepia,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Brightness => "brightness",
            FilterKind::Contrast => "contrast",
            FilterKind::Saturation => "saturation",
            FilterKind::Blur => "blur",
            FilterKind::Hue => "hue",
            FilterKind::Sepia => "sepia",
        }
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brightness" => Ok(FilterKind::Brightness),
            "contrast" => Ok(FilterKind::Contrast),
            "saturation" | "saturate" => Ok(FilterKind::Saturation),
            "blur" => Ok(FilterKind::Blur),
            "hue" | "hue-rotate" => Ok(FilterKind::Hue),
            "sepia" => Ok(FilterKind::Sepia),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Filter parameters, reapplied on every render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterStack {
    /// Brightness in percent (100 = unchanged).
    pub brightness: f32,
    /// Contrast in percent (100 = unchanged).
    pub contrast: f32,
    /// Saturation in percent (100 = unchanged, 0 = grayscale).
    pub saturation: f32,
    /// Gaussian blur radius in pixels.
    pub blur: f32,
    /// Hue rotation in degrees.
    pub hue: f32,
    /// Sepia amount in percent.
    pub sepia: f32,
}

impl Default for FilterStack {
    fn default() -> Self {
        Self {
            brightness: NEUTRAL_PERCENT,
            contrast: NEUTRAL_PERCENT,
            saturation: NEUTRAL_PERCENT,
            blur: 0.0,
            hue: 0.0,
            sepia: 0.0,
        }
    }
}

impl FilterStack {
    pub fn get(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Contrast => self.contrast,
            FilterKind::Saturation => self.saturation,
            FilterKind::Blur => self.blur,
            FilterKind::Hue => self.hue,
            FilterKind::Sepia => self.sepia,
        }
    }

    pub fn set(&mut self, kind: FilterKind, value: f32) {
        let slot = match kind {
            FilterKind::Brightness => &mut self.brightness,
            FilterKind::Contrast => &mut self.contrast,
            FilterKind::Saturation => &mut self.saturation,
            FilterKind::Blur => &mut self.blur,
            FilterKind::Hue => &mut self.hue,
            FilterKind::Sepia => &mut self.sepia,
        };
        *slot = value;
    }

    /// Returns true when applying the stack would leave pixels unchanged.
    pub fn is_neutral(&self) -> bool {
        self.color_ops_before_blur().is_empty()
            && !self.has_blur()
            && self.color_ops_after_blur().is_empty()
    }

    /// Applies every filter in the fixed order, in place.
    pub fn apply(&self, image: &mut RgbaImage) {
        map_colors(image, &self.color_ops_before_blur());
        if let Some(sigma) = self.blur_sigma(image.width(), image.height()) {
            blur_premultiplied(image, sigma);
        }
        map_colors(image, &self.color_ops_after_blur());
    }

    fn color_ops_before_blur(&self) -> Vec<ColorOp> {
        let mut ops = Vec::with_capacity(3);
        let brightness = self.brightness.max(0.0) / 100.0;
        if (brightness - 1.0).abs() > f32::EPSILON {
            ops.push(ColorOp::Linear {
                slope: brightness,
                intercept: 0.0,
            });
        }
        let contrast = self.contrast.max(0.0) / 100.0;
        if (contrast - 1.0).abs() > f32::EPSILON {
            ops.push(ColorOp::Linear {
                slope: contrast,
                intercept: 0.5 - 0.5 * contrast,
            });
        }
        let saturation = self.saturation.max(0.0) / 100.0;
        if (saturation - 1.0).abs() > f32::EPSILON {
            ops.push(ColorOp::Matrix(saturate_matrix(saturation)));
        }
        ops
    }

    fn has_blur(&self) -> bool {
        self.blur > 0.0
    }

    /// Blur radius for a layer of the given size. Past the longest side the
    /// result is already a flat average, so larger radii are capped there.
    #[allow(clippy::cast_precision_loss)]
    fn blur_sigma(&self, width: u32, height: u32) -> Option<f32> {
        if !self.has_blur() {
            return None;
        }
        let limit = width.max(height).max(1) as f32;
        Some(self.blur.min(limit))
    }

    fn color_ops_after_blur(&self) -> Vec<ColorOp> {
        let mut ops = Vec::with_capacity(2);
        if self.hue.rem_euclid(360.0).abs() > f32::EPSILON {
            ops.push(ColorOp::Matrix(hue_rotate_matrix(self.hue)));
        }
        let sepia = self.sepia.clamp(0.0, 100.0) / 100.0;
        if sepia > 0.0 {
            ops.push(ColorOp::Matrix(sepia_matrix(sepia)));
        }
        ops
    }
}

impl fmt::Display for FilterStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "brightness({}%) contrast({}%) saturate({}%) blur({}px) hue-rotate({}deg) sepia({}%)",
            self.brightness, self.contrast, self.saturation, self.blur, self.hue, self.sepia
        )
    }
}

type Matrix3 = [[f32; 3]; 3];

#[derive(Debug, Clone, Copy)]
enum ColorOp {
    Linear { slope: f32, intercept: f32 },
    Matrix(Matrix3),
}

impl ColorOp {
    fn apply(self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match self {
            ColorOp::Linear { slope, intercept } => rgb.map(|c| c * slope + intercept),
            ColorOp::Matrix(m) => [
                m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
                m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
                m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
            ],
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix3 {
    let inv = 1.0 - amount;
    [
        [0.393 + 0.607 * inv, 0.769 - 0.769 * inv, 0.189 - 0.189 * inv],
        [0.349 - 0.349 * inv, 0.686 + 0.314 * inv, 0.168 - 0.168 * inv],
        [0.272 - 0.272 * inv, 0.534 - 0.534 * inv, 0.131 + 0.869 * inv],
    ]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn map_colors(image: &mut RgbaImage, ops: &[ColorOp]) {
    if ops.is_empty() {
        return;
    }
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let mut rgb = [r, g, b].map(|c| f32::from(c) / 255.0);
        for op in ops {
            rgb = op.apply(rgb);
        }
        let [r, g, b] = rgb.map(|c| (c * 255.0).round() as u8);
        pixel.0 = [r, g, b, a];
    }
}

/// Blurs in premultiplied space so transparent neighbours do not bleed black
/// into the edges.
fn blur_premultiplied(image: &mut RgbaImage, sigma: f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        pixel.0 = [mul_alpha(r, a), mul_alpha(g, a), mul_alpha(b, a), a];
    }
    let mut blurred = image_rs::imageops::blur(&*image, sigma);
    for pixel in blurred.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        pixel.0 = [div_alpha(r, a), div_alpha(g, a), div_alpha(b, a), a];
    }
    *image = blurred;
}

#[allow(clippy::cast_possible_truncation)]
fn mul_alpha(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

#[allow(clippy::cast_possible_truncation)]
fn div_alpha(c: u8, a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::Rgba;

    fn solid(pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(3, 3, Rgba(pixel))
    }

    fn center(image: &RgbaImage) -> [u8; 4] {
        image.get_pixel(1, 1).0
    }

    #[test]
    fn default_stack_is_neutral() {
        let stack = FilterStack::default();
        assert!(stack.is_neutral());
        let mut img = solid([12, 34, 56, 255]);
        stack.apply(&mut img);
        assert_eq!(center(&img), [12, 34, 56, 255]);
    }

    #[test]
    fn full_hue_turn_is_neutral() {
        let stack = FilterStack {
            hue: 360.0,
            ..FilterStack::default()
        };
        assert!(stack.is_neutral());
    }

    #[test]
    fn brightness_scales_channels() {
        let stack = FilterStack {
            brightness: 50.0,
            ..FilterStack::default()
        };
        let mut img = solid([200, 100, 50, 255]);
        stack.apply(&mut img);
        assert_eq!(center(&img), [100, 50, 25, 255]);
    }

    #[test]
    fn brightness_applies_before_contrast() {
        // brightness 200% saturates mid-gray to white, contrast 50% then pulls
        // it back toward 0.5: (1.0 - 0.5) * 0.5 + 0.5 = 0.75.
        // The reverse order would leave the pixel at pure white.
        let stack = FilterStack {
            brightness: 200.0,
            contrast: 50.0,
            ..FilterStack::default()
        };
        let mut img = solid([128, 128, 128, 255]);
        stack.apply(&mut img);
        assert_eq!(center(&img)[0], 191);
    }

    #[test]
    fn zero_saturation_produces_gray() {
        let stack = FilterStack {
            saturation: 0.0,
            ..FilterStack::default()
        };
        let mut img = solid([255, 0, 0, 255]);
        stack.apply(&mut img);
        let [r, g, b, _] = center(&img);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn full_sepia_tints_white() {
        let stack = FilterStack {
            sepia: 100.0,
            ..FilterStack::default()
        };
        let mut img = solid([255, 255, 255, 255]);
        stack.apply(&mut img);
        assert_eq!(center(&img), [255, 255, 239, 255]);
    }

    #[test]
    fn sepia_saturates_above_hundred() {
        let over = FilterStack {
            sepia: 250.0,
            ..FilterStack::default()
        };
        let full = FilterStack {
            sepia: 100.0,
            ..FilterStack::default()
        };
        let mut a = solid([90, 160, 30, 255]);
        let mut b = a.clone();
        over.apply(&mut a);
        full.apply(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn blur_spreads_a_single_pixel() {
        let mut img = RgbaImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let stack = FilterStack {
            blur: 1.5,
            ..FilterStack::default()
        };
        stack.apply(&mut img);
        assert!(img.get_pixel(4, 4).0[0] < 255);
        assert!(img.get_pixel(5, 4).0[0] > 0);
    }

    #[test]
    fn huge_and_non_finite_blur_radii_are_bounded() {
        for blur in [1.0e6, f32::INFINITY, f32::MAX] {
            let stack = FilterStack {
                blur,
                ..FilterStack::default()
            };
            assert_eq!(stack.blur_sigma(16, 9), Some(16.0));
            let mut img = RgbaImage::from_pixel(16, 9, Rgba([0, 0, 0, 255]));
            img.put_pixel(8, 4, Rgba([255, 255, 255, 255]));
            stack.apply(&mut img);
            assert_eq!(img.dimensions(), (16, 9));
        }
    }

    #[test]
    fn nan_blur_is_ignored() {
        let stack = FilterStack {
            blur: f32::NAN,
            ..FilterStack::default()
        };
        assert_eq!(stack.blur_sigma(16, 16), None);
        assert!(stack.is_neutral());
        let mut img = solid([12, 34, 56, 255]);
        stack.apply(&mut img);
        assert_eq!(center(&img), [12, 34, 56, 255]);
    }

    #[test]
    fn transparent_pixels_are_left_alone() {
        let stack = FilterStack {
            brightness: 300.0,
            ..FilterStack::default()
        };
        let mut img = solid([10, 10, 10, 0]);
        stack.apply(&mut img);
        assert_eq!(center(&img), [10, 10, 10, 0]);
    }

    #[test]
    fn description_lists_filters_in_order() {
        let text = FilterStack::default().to_string();
        assert_eq!(
            text,
            "brightness(100%) contrast(100%) saturate(100%) blur(0px) hue-rotate(0deg) sepia(0%)"
        );
    }

    #[test]
    fn filter_kind_parses_aliases() {
        assert_eq!("Saturate".parse::<FilterKind>(), Ok(FilterKind::Saturation));
        assert_eq!("hue-rotate".parse::<FilterKind>(), Ok(FilterKind::Hue));
        assert!("gamma".parse::<FilterKind>().is_err());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let stack: FilterStack = serde_json::from_str(r#"{"blur": 2}"#).expect("parse");
        assert_eq!(stack.blur, 2.0);
        assert_eq!(stack.brightness, NEUTRAL_PERCENT);
    }
}
