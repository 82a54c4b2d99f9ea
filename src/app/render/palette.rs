use eframe::egui::Color32;

use crate::config::Hsl;

/// Theme colours the graph draws with, one set per light/dark mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Palette {
    pub secondary: Color32,
    pub tertiary: Color32,
    pub gray: Color32,
    pub light: Color32,
    pub dark: Color32,
}

impl Palette {
    pub(in crate::app) fn for_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                secondary: Color32::from_rgb(0x7b, 0x97, 0xaa),
                tertiary: Color32::from_rgb(0x84, 0xa5, 0x9d),
                gray: Color32::from_rgb(0x64, 0x64, 0x64),
                light: Color32::from_rgb(0x16, 0x16, 0x18),
                dark: Color32::from_rgb(0xeb, 0xeb, 0xec),
            }
        } else {
            Self {
                secondary: Color32::from_rgb(0x28, 0x4b, 0x63),
                tertiary: Color32::from_rgb(0x84, 0xa5, 0x9d),
                gray: Color32::from_rgb(0xb8, 0xb8, 0xb8),
                light: Color32::from_rgb(0xfa, 0xf8, 0xf8),
                dark: Color32::from_rgb(0x2b, 0x2b, 0x2b),
            }
        }
    }
}

/// `h` in degrees, `s` and `l` in percent.
pub(in crate::app) fn hsl_color(hsl: Hsl) -> Color32 {
    let hue = hsl.h.rem_euclid(360.0) / 360.0;
    let saturation = (hsl.s / 100.0).clamp(0.0, 1.0);
    let lightness = (hsl.l / 100.0).clamp(0.0, 1.0);

    if saturation <= f32::EPSILON {
        let gray = (lightness * 255.0).round() as u8;
        return Color32::from_rgb(gray, gray, gray);
    }

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    let channel = |offset: f32| {
        let t = (hue + offset).rem_euclid(1.0);
        let value = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (value * 255.0).round() as u8
    };

    Color32::from_rgb(channel(1.0 / 3.0), channel(0.0), channel(-1.0 / 3.0))
}

pub(in crate::app) fn parse_color(raw: &str) -> Option<Color32> {
    Color32::from_hex(raw.trim()).ok()
}
