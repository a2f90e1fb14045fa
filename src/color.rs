use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// `n` visually distinct colours with evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.6);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Stable colour per category label (roles on the Players page).
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new(labels: &[String]) -> Self {
        let mapping = labels
            .iter()
            .cloned()
            .zip(generate_palette(labels.len()))
            .collect();
        Self { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

/// Background tint for a quadrant row in the comparison tables.
pub fn quadrant_color(quadrant: fanta_dash::analysis::classify::Quadrant) -> Color32 {
    use fanta_dash::analysis::classify::Quadrant;
    match quadrant {
        Quadrant::Stars => Color32::from_rgb(46, 160, 67),
        Quadrant::HiddenGems => Color32::from_rgb(31, 119, 180),
        Quadrant::Potential => Color32::from_rgb(255, 159, 28),
        Quadrant::Risky => Color32::from_rgb(214, 39, 40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn unknown_label_is_gray() {
        let colors = CategoryColors::new(&["A".to_string(), "D".to_string()]);
        assert_ne!(colors.color_for("A"), Color32::GRAY);
        assert_eq!(colors.color_for("X"), Color32::GRAY);
        assert_ne!(colors.color_for("A"), colors.color_for("D"));
    }
}
