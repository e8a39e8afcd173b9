//! Class → color assignment.
//!
//! Colors are a pure function of the class name: a fixed table for the
//! common COCO classes, and a string hash mapped to a hue for everything
//! else. Nothing is cached, so the vocabulary can grow without bound.

use vdet_models::Color;

/// Saturation (percent) of generated class colors.
pub const GENERATED_SATURATION: u8 = 70;

/// Lightness (percent) of generated class colors.
pub const GENERATED_LIGHTNESS: u8 = 60;

/// Hue step between consecutive chart series (golden angle, rounded).
pub const GOLDEN_ANGLE_DEG: i64 = 137;

/// Fixed colors for well-known classes.
const KNOWN_CLASS_COLORS: &[(&str, Color)] = &[
    ("person", Color::from_hex(0xFF6B6B)),
    ("car", Color::from_hex(0x4ECDC4)),
    ("truck", Color::from_hex(0x45B7D1)),
    ("bus", Color::from_hex(0xFFA07A)),
    ("motorcycle", Color::from_hex(0x98D8C8)),
    ("bicycle", Color::from_hex(0xF7DC6F)),
    ("dog", Color::from_hex(0xBB8FCE)),
    ("cat", Color::from_hex(0x85C1E2)),
];

/// Look up a class in the fixed table.
pub fn known_class_color(class_name: &str) -> Option<Color> {
    KNOWN_CLASS_COLORS
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, color)| *color)
}

/// Deterministic color for a class name.
pub fn color_for(class_name: &str) -> Color {
    known_class_color(class_name).unwrap_or_else(|| {
        Color::hsl(
            class_name_hash(class_name),
            GENERATED_SATURATION,
            GENERATED_LIGHTNESS,
        )
    })
}

/// `hash = code + ((hash << 5) - hash)` over UTF-16 code units.
///
/// The shift operates on the low 32 bits of the running hash while the
/// subtraction and addition do not, so the result may exceed `i32`.
pub fn class_name_hash(class_name: &str) -> i64 {
    class_name.encode_utf16().fold(0i64, |hash, code| {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        code as i64 + (shifted - hash)
    })
}

/// Background and border colors for `n` chart series.
///
/// Series `i` gets hue `(i * 137) mod 360`; the background is 80% opaque
/// and the border fully opaque.
pub fn chart_palette(n: usize) -> Vec<(Color, Color)> {
    (0..n)
        .map(|i| {
            let hue = (i as i64 * GOLDEN_ANGLE_DEG).rem_euclid(360);
            let background = Color::hsla(hue, GENERATED_SATURATION, GENERATED_LIGHTNESS, 0.8);
            (background, background.with_alpha(1.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_classes_use_table() {
        assert_eq!(color_for("person").to_css(), "#FF6B6B");
        assert_eq!(color_for("car").to_css(), "#4ECDC4");
        assert_eq!(color_for("cat").to_css(), "#85C1E2");
    }

    #[test]
    fn test_hash_matches_reference_values() {
        // "a": 97 + (0 - 0)
        assert_eq!(class_name_hash("a"), 97);
        // "ab": 98 + (97 * 32 - 97)
        assert_eq!(class_name_hash("ab"), 98 + 97 * 31);
        assert_eq!(class_name_hash(""), 0);
    }

    #[test]
    fn test_generated_color_uses_hash_hue() {
        let hash = class_name_hash("ab");
        assert_eq!(
            color_for("ab").to_css(),
            format!("hsl({}, 70%, 60%)", hash.rem_euclid(360))
        );
    }

    #[test]
    fn test_color_for_is_deterministic() {
        let names = ["umbrella", "traffic light", "person", "zebra", "umbrella"];
        let first: Vec<Color> = names.iter().map(|n| color_for(n)).collect();
        let reversed: Vec<Color> = names.iter().rev().map(|n| color_for(n)).collect();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(first[i], color_for(name));
            assert_eq!(first[i], reversed[names.len() - 1 - i]);
        }
        assert_eq!(first[0], first[4]);
    }

    #[test]
    fn test_long_names_stay_in_hue_range() {
        let long = "a very long class name that overflows the thirty two bit hash";
        match color_for(long) {
            Color::Hsl { hue, .. } => assert!(hue < 360),
            other => panic!("unexpected color {:?}", other),
        }
    }

    #[test]
    fn test_chart_palette() {
        let palette = chart_palette(3);
        assert_eq!(palette[0].0.to_css(), "hsla(0, 70%, 60%, 0.8)");
        assert_eq!(palette[1].0.to_css(), "hsla(137, 70%, 60%, 0.8)");
        assert_eq!(palette[2].0.to_css(), "hsla(274, 70%, 60%, 0.8)");
        assert_eq!(palette[1].1.to_css(), "hsla(137, 70%, 60%, 1)");
    }
}
