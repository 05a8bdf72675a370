// ── Item type taxonomy ──
//
// Item types label inventory items (Capacitor, Resistor, ...). Each type
// carries an HSL badge color derived deterministically from its name so
// every client renders the same color without coordination.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityId;
use crate::error::CoreError;

/// Types offered before any custom type has been added.
pub const DEFAULT_ITEM_TYPES: [&str; 5] = ["Capacitor", "Resistor", "IC", "Connector", "Misc"];

/// A user-defined item type, stored in `inventoryItemTypes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: EntityId,
    pub name: String,
    /// `"H S% L%"`, e.g. `"170 65% 65%"`.
    #[serde(default)]
    pub color: String,
}

/// 32-bit rolling string hash (`h * 31 + c` over UTF-16 code units).
fn name_hash(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |h, c| {
        i32::from(c).wrapping_add(h.wrapping_shl(5).wrapping_sub(h))
    })
}

/// Badge color for a type name: hue 0-359, saturation 60-74%, lightness 65-74%.
pub fn color_for(name: &str) -> String {
    let h = i64::from(name_hash(name)).unsigned_abs();
    let hue = h % 360;
    let saturation = 60 + h % 15;
    let lightness = 65 + h % 10;
    format!("{hue} {saturation}% {lightness}%")
}

/// Validate a new type name against the existing set.
pub fn validate_type_name(name: &str, existing: &[String]) -> Result<(), CoreError> {
    let name = name.trim();
    if name.chars().count() < 2 {
        return Err(CoreError::validation(
            "Type name must be at least 2 characters.",
        ));
    }
    if existing.iter().any(|e| e.eq_ignore_ascii_case(name)) {
        return Err(CoreError::validation(format!(
            "Item type \"{name}\" already exists."
        )));
    }
    Ok(())
}

pub(crate) fn type_fields(name: &str) -> Map<String, Value> {
    let name = name.trim();
    let mut map = Map::new();
    map.insert("name".into(), name.into());
    map.insert("color".into(), color_for(name).into());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_matches_known_values() {
        // 'I' = 73, 'C' = 67 -> 67 + (73 * 31) = 2330
        assert_eq!(name_hash("IC"), 2330);
        assert_eq!(color_for("IC"), "170 65% 65%");
        assert_eq!(color_for(""), "0 60% 65%");
    }

    #[test]
    fn color_is_stable_and_in_range() {
        for name in DEFAULT_ITEM_TYPES {
            let color = color_for(name);
            assert_eq!(color, color_for(name));
            let parts: Vec<u64> = color
                .split(' ')
                .map(|p| p.trim_end_matches('%').parse().unwrap_or(u64::MAX))
                .collect();
            assert!(parts[0] < 360);
            assert!((60..75).contains(&parts[1]));
            assert!((65..75).contains(&parts[2]));
        }
    }

    #[test]
    fn hash_wraps_like_32_bit_integers() {
        // Long names overflow i32 many times over; must not panic.
        let long = "Electrolytic Capacitor Assortment Kit ".repeat(20);
        let _ = color_for(&long);
    }

    #[test]
    fn rejects_duplicates_and_short_names() {
        let existing = vec!["Capacitor".to_owned()];
        assert!(validate_type_name("capacitor", &existing).is_err());
        assert!(validate_type_name("X", &existing).is_err());
        assert!(validate_type_name("Sensor", &existing).is_ok());
    }
}
