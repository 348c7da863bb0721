//! Persistent character sheets.
//!
//! A sheet is the durable template behind a room-bound [`crate::Actor`]:
//! attributes, hit points, equipment, and the closed set of condition
//! flags. Sheets travel with the party between rooms; actors are rebuilt
//! per room.

use std::collections::BTreeMap;

use crate::dice::DiceExpr;
use crate::tables::{Armory, WeaponCategory, WeaponStats};

/// Allegiance of an actor, used to group the party and pick enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Ally,
    #[default]
    Neutral,
    Hostile,
}

/// The six ability scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl Attributes {
    /// Standard ability modifier: floor((score - 10) / 2).
    pub fn modifier(score: i32) -> i32 {
        (score - 10).div_euclid(2)
    }

    pub fn dexterity_mod(&self) -> i32 {
        Self::modifier(self.dexterity)
    }

    pub fn strength_mod(&self) -> i32 {
        Self::modifier(self.strength)
    }
}

bitflags::bitflags! {
    /// Closed set of condition flags carried on the sheet.
    ///
    /// `BLOCKING` conditions exclude an actor from the round's initiative.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct Conditions: u16 {
        const DEAD        = 1 << 0;
        const UNCONSCIOUS = 1 << 1;
        const STUNNED     = 1 << 2;
        const SLEEPING    = 1 << 3;
        const RESTING     = 1 << 4;
        const POISONED    = 1 << 5;
        const FRIGHTENED  = 1 << 6;

        const BLOCKING = Self::DEAD.bits()
            | Self::UNCONSCIOUS.bits()
            | Self::STUNNED.bits()
            | Self::SLEEPING.bits();
    }
}

/// Proficiency level with a weapon category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(strum::Display, strum::EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Mastery {
    #[default]
    None,
    Proficient,
}

/// Per-category weapon training.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WeaponMastery {
    pub simple: Mastery,
    pub martial: Mastery,
}

impl Default for WeaponMastery {
    fn default() -> Self {
        Self {
            simple: Mastery::Proficient,
            martial: Mastery::None,
        }
    }
}

impl WeaponMastery {
    pub fn for_category(&self, category: WeaponCategory) -> Mastery {
        match category {
            WeaponCategory::Simple => self.simple,
            WeaponCategory::Martial => self.martial,
        }
    }
}

/// Equipped item slots.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Equipped {
    pub armor: Option<String>,
    pub main_hand: Option<String>,
    pub off_hand: Option<String>,
}

/// A full character sheet.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CharacterSheet {
    // Identity
    pub name: String,
    pub race: String,
    pub class: String,
    pub level: u32,
    pub alignment: Option<String>,
    #[serde(default)]
    pub faction: Faction,

    // Abilities
    pub attributes: Attributes,

    // Combat block
    pub max_hp: i32,
    pub current_hp: i32,
    #[serde(default)]
    pub temp_hp: i32,
    pub armor_class: i32,
    /// Full-turn movement allowance in meters, before encumbrance.
    pub speed_m: f32,
    pub proficiency_bonus: i32,
    pub hit_dice: DiceExpr,
    #[serde(default)]
    pub conditions: Conditions,

    // Possessions
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub equipped: Equipped,
    #[serde(default)]
    pub weapon_mastery: WeaponMastery,

    // Progression
    #[serde(default)]
    pub xp: u32,
    pub objective: Option<String>,
    pub notes: Option<String>,
}

impl CharacterSheet {
    /// A level-1 commoner; fields are then adjusted by loaders and tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            race: "human".to_string(),
            class: "commoner".to_string(),
            level: 1,
            alignment: None,
            faction: Faction::Neutral,
            attributes: Attributes::default(),
            max_hp: 10,
            current_hp: 10,
            temp_hp: 0,
            armor_class: 10,
            speed_m: 9.0,
            proficiency_bonus: 2,
            hit_dice: DiceExpr::new(1, 8, 0),
            conditions: Conditions::empty(),
            equipment: Vec::new(),
            equipped: Equipped::default(),
            weapon_mastery: WeaponMastery::default(),
            xp: 0,
            objective: None,
            notes: None,
        }
    }

    /// Whether the character can take part in a round at all.
    pub fn is_incapacitated(&self) -> bool {
        self.current_hp <= 0 || self.conditions.intersects(Conditions::BLOCKING)
    }

    /// Applies damage, temp HP first. Returns true if this kills.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        let amount = amount.max(0);
        let absorbed = amount.min(self.temp_hp);
        self.temp_hp -= absorbed;
        self.current_hp -= amount - absorbed;
        if self.current_hp <= 0 {
            self.current_hp = 0;
            self.conditions.insert(Conditions::DEAD);
            return true;
        }
        false
    }

    /// Heals up to max HP; the dead stay dead.
    pub fn heal(&mut self, amount: i32) {
        if self.conditions.contains(Conditions::DEAD) {
            return;
        }
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
    }

    /// Total weight carried, resolved through the armory tables.
    pub fn carried_weight_kg(&self, armory: &dyn Armory) -> f32 {
        self.equipment
            .iter()
            .map(|item| armory.item_weight_kg(item))
            .sum()
    }

    /// Carry capacity in kilograms, scaled from strength.
    pub fn max_carry_kg(&self) -> f32 {
        self.attributes.strength as f32 * 7.5
    }

    /// Encumbered above half capacity; encumbrance halves movement.
    pub fn is_encumbered(&self, armory: &dyn Armory) -> bool {
        self.carried_weight_kg(armory) > self.max_carry_kg() / 2.0
    }

    /// Movement budget for one turn, after encumbrance.
    pub fn movement_budget_m(&self, armory: &dyn Armory) -> f32 {
        if self.is_encumbered(armory) {
            self.speed_m / 2.0
        } else {
            self.speed_m
        }
    }

    /// Attack bonus with a weapon: proficiency when trained in its
    /// category, nothing otherwise.
    pub fn attack_bonus(&self, weapon: &WeaponStats) -> i32 {
        match self.weapon_mastery.for_category(weapon.category) {
            Mastery::Proficient => self.proficiency_bonus,
            Mastery::None => 0,
        }
    }

    /// Name of the wielded main-hand weapon, if any.
    pub fn wielded_weapon(&self) -> Option<&str> {
        self.equipped.main_hand.as_deref()
    }

    /// One-line summary for decision-provider context.
    pub fn summary(&self) -> String {
        format!(
            "{} is a {} {} {} of level {} (xp {}), faction {}, HP {}/{}",
            self.name,
            self.alignment.as_deref().unwrap_or("neutral"),
            self.race,
            self.class,
            self.level,
            self.xp,
            self.faction,
            self.current_hp,
            self.max_hp,
        )
    }
}

/// Character sheets for the whole party, keyed by actor name.
pub type SheetLibrary = BTreeMap<String, CharacterSheet>;
