use serde::{Deserialize, Serialize};

/// RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness (luminosity method).
    pub fn grey(&self) -> f64 {
        0.21 * self.r + 0.72 * self.g + 0.07 * self.b
    }

    pub fn to_css(&self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            alpha
        )
    }
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Default series color of the report theme.
pub const THEME_BLUE: Rgb = Rgb::new(0.0, 0.561, 0.835);

/// Green for small patches up to full red at `threshold` lines and beyond.
pub fn size_color(size: u64, threshold: f64) -> Rgb {
    let ratio = if threshold > 0.0 {
        (size as f64).min(threshold) / threshold
    } else if size > 0 {
        1.0
    } else {
        0.0
    };
    Rgb::new(ratio, 1.0 - ratio, 0.0)
}

/// Marker area shrinks with brightness so that large (red) patches stand out.
pub fn marker_size(color: &Rgb, base: f64) -> f64 {
    (1.0 - color.grey()) * base
}
