use tracing::warn;

use crate::months::MonthConfig;

/// Fill for countries that have not started or are not assigned to a month.
pub const NEUTRAL_COLOR: &str = "#F5F5F5";
pub const TIER_COUNT: usize = 5;

/// Lightness of the palest tier before interpolating toward the month color.
const PALE_LIGHTNESS: f64 = 0.9;
const PALE_SATURATION_SCALE: f64 = 0.8;

/// Map a 0-100 progress value to a tier in `1..=5`.
///
/// Out-of-range values are clamped and non-finite values count as 0. Band
/// edges (20, 40, 60, 80) belong to the lower tier.
pub fn tier_of(progress: impl Into<f64>) -> u8 {
    let raw = progress.into();
    let p = if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    };

    if p <= 20.0 {
        1
    } else if p <= 40.0 {
        2
    } else if p <= 60.0 {
        3
    } else if p <= 80.0 {
        4
    } else {
        5
    }
}

/// Resolve the fill color of `iso3` at `progress` against a month palette.
///
/// Unassigned countries resolve to [`NEUTRAL_COLOR`] and log a data-quality
/// warning; the lookup never fails.
pub fn color_of<'a>(iso3: &str, progress: impl Into<f64>, palette: &'a [MonthConfig]) -> &'a str {
    let Some(month) = palette.iter().find(|month| month.contains(iso3)) else {
        warn!(iso3, "country not assigned to any month");
        return NEUTRAL_COLOR;
    };
    month.tier_color(tier_of(progress))
}

pub fn tier_label(progress: impl Into<f64>) -> &'static str {
    match tier_of(progress) {
        1 => "Iniciado (0-20%)",
        2 => "Em Progresso (21-40%)",
        3 => "No Meio (41-60%)",
        4 => "Quase Completo (61-80%)",
        _ => "Completo (81-100%)",
    }
}

/// Five tier colors for a month, palest first, ending at `base` itself.
pub fn tier_ramp(base: (u8, u8, u8)) -> [String; TIER_COUNT] {
    let (h, s, l) = rgb_to_hsl(base.0, base.1, base.2);
    let pale = (h, s * PALE_SATURATION_SCALE, PALE_LIGHTNESS.max(l));

    std::array::from_fn(|index| {
        if index == TIER_COUNT - 1 {
            return to_hex(base);
        }
        let t = index as f64 / (TIER_COUNT - 1) as f64;
        let (h, s, l) = interpolate_hsl(pale, (h, s, l), t);
        to_hex(hsl_to_rgb(h, s, l))
    })
}

/// Soft, deterministic color for a user's placeholder marker.
pub fn user_color(handle: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(handle.as_bytes());
    let hue = f64::from(hash % 360);
    hsl_to_rgb(hue, 0.45, 0.65)
}

pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Interpolate between two HSL colors using shortest hue path.
pub fn interpolate_hsl(from: (f64, f64, f64), to: (f64, f64, f64), t: f64) -> (f64, f64, f64) {
    let mut dh = to.0 - from.0;
    if dh > 180.0 {
        dh -= 360.0;
    } else if dh < -180.0 {
        dh += 360.0;
    }

    let h = (from.0 + dh * t).rem_euclid(360.0);
    let s = from.1 + (to.1 - from.1) * t;
    let l = from.2 + (to.2 - from.2) * t;

    (h, s, l)
}
