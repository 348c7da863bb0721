//! Equipment and spell tables.
//!
//! One `DataTables` is loaded at session start and passed by reference as
//! the core's [`Armory`] wherever stats are needed; there is no global
//! registry.

use std::collections::HashMap;
use std::path::Path;

use skirmish_core::{Armory, ArmorStats, SpellStats, WeaponStats};

use crate::ContentError;

/// The YAML-backed lookup tables for weapons, armor, and spells.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DataTables {
    #[serde(default)]
    pub weapons: HashMap<String, WeaponStats>,
    #[serde(default)]
    pub armor: HashMap<String, ArmorStats>,
    #[serde(default)]
    pub spells: HashMap<String, SpellStats>,
}

impl Armory for DataTables {
    fn weapon(&self, name: &str) -> Option<&WeaponStats> {
        self.weapons.get(name)
    }

    fn armor(&self, name: &str) -> Option<&ArmorStats> {
        self.armor.get(name)
    }

    fn spell(&self, name: &str) -> Option<&SpellStats> {
        self.spells.get(name)
    }
}

/// Loads the data tables file.
pub fn load_tables(path: &Path) -> Result<DataTables, ContentError> {
    crate::read_yaml(path)
}
