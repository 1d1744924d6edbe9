use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;

const CATEGORY_PALETTE: [Color32; 8] = [
    Color32::from_rgb(98, 178, 122),
    Color32::from_rgb(222, 164, 84),
    Color32::from_rgb(103, 160, 228),
    Color32::from_rgb(206, 110, 126),
    Color32::from_rgb(170, 132, 214),
    Color32::from_rgb(88, 190, 196),
    Color32::from_rgb(196, 186, 96),
    Color32::from_rgb(214, 128, 86),
];
const UNCATEGORIZED: Color32 = Color32::from_rgb(140, 150, 162);

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount).round() as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

/// Darkens and fades; alpha never drops below 45% so dimmed nodes stay legible.
pub fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + factor * 0.55)) as u8,
    )
}

/// Stable palette color for a category name.
pub fn category_color(category: Option<&str>) -> Color32 {
    let Some(category) = category else {
        return UNCATEGORIZED;
    };
    let mut hasher = DefaultHasher::new();
    category.hash(&mut hasher);
    CATEGORY_PALETTE[(hasher.finish() % CATEGORY_PALETTE.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        let a = Color32::from_rgb(0, 100, 200);
        let b = Color32::from_rgb(200, 100, 0);
        assert_eq!(blend_color(a, b, 0.0), a);
        assert_eq!(blend_color(a, b, 1.0), b);
        assert_eq!(blend_color(a, b, 0.5), Color32::from_rgb(100, 100, 100));
    }

    #[test]
    fn dimming_darkens_and_fades() {
        let dimmed = dim_color(Color32::from_rgb(200, 200, 200), 0.5);
        assert!(dimmed.r() <= 100);
        assert!(dimmed.a() < 255);
    }

    #[test]
    fn categories_map_to_stable_colors() {
        assert_eq!(category_color(Some("fungi")), category_color(Some("fungi")));
        assert_eq!(category_color(None), UNCATEGORIZED);
        assert!(CATEGORY_PALETTE.contains(&category_color(Some("plantae"))));
    }
}
