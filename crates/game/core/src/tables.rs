//! Lookup-table oracle for equipment and spell statistics.
//!
//! The engine never loads data files itself; it consumes an [`Armory`]
//! built once at session start and passed by reference (no module-level
//! singletons). The content crate provides the YAML-backed implementation.

use crate::dice::DiceExpr;

/// Weapon proficiency category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    Simple,
    Martial,
}

/// Static statistics for one weapon.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WeaponStats {
    pub damage: DiceExpr,
    pub category: WeaponCategory,
    pub weight_kg: f32,
    /// Maximum attack range in meters; melee weapons reach one tile.
    pub range_m: f32,
}

/// Static statistics for one armor piece.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ArmorStats {
    pub armor_class: i32,
    pub weight_kg: f32,
}

/// Static statistics for one spell.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpellStats {
    pub damage: DiceExpr,
    pub range_m: f32,
}

/// Read-only access to the equipment and spell tables.
pub trait Armory {
    fn weapon(&self, name: &str) -> Option<&WeaponStats>;
    fn armor(&self, name: &str) -> Option<&ArmorStats>;
    fn spell(&self, name: &str) -> Option<&SpellStats>;

    /// Weight of any known item, for encumbrance bookkeeping. Unknown
    /// items weigh nothing.
    fn item_weight_kg(&self, name: &str) -> f32 {
        if let Some(weapon) = self.weapon(name) {
            weapon.weight_kg
        } else if let Some(armor) = self.armor(name) {
            armor.weight_kg
        } else {
            0.0
        }
    }
}

/// Empty armory for tests and tools that never resolve equipment.
pub struct EmptyArmory;

impl Armory for EmptyArmory {
    fn weapon(&self, _name: &str) -> Option<&WeaponStats> {
        None
    }

    fn armor(&self, _name: &str) -> Option<&ArmorStats> {
        None
    }

    fn spell(&self, _name: &str) -> Option<&SpellStats> {
        None
    }
}
