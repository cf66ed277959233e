//! Data models for item payloads and parsed food effects.

use serde::Deserialize;

/// Item identifier assigned by the remote database.
pub type ItemId = u32;

/// Bit in `Flags1` marking a conjured item.
pub const CONJURED_FLAG: i64 = 0x2;

/// Spell record attached to an item
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpell {
    #[serde(rename = "Text")]
    pub text: String,
}

/// Item document as returned by the item API (after unwrapping)
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(rename = "ID")]
    pub id: ItemId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Flags1")]
    pub flags1: i64,
    #[serde(rename = "Spells", default)]
    pub spells: Option<Vec<RawSpell>>,
}

impl RawItem {
    pub fn is_conjured(&self) -> bool {
        self.flags1 & CONJURED_FLAG != 0
    }

    pub fn spells(&self) -> &[RawSpell] {
        self.spells.as_deref().unwrap_or_default()
    }
}

/// Resource restored by a food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectType {
    Health,
    Mana,
    Combo,
}

impl EffectType {
    /// Map a captured resource word ("health", "Mana", ...) to an effect type.
    pub fn from_resource(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("health") {
            Some(EffectType::Health)
        } else if word.eq_ignore_ascii_case("mana") {
            Some(EffectType::Mana)
        } else {
            None
        }
    }
}

/// Restoration effect extracted from one spell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub effect_type: EffectType,
    pub value: String,
    pub value2: Option<String>, // mana amount, combo only
    pub buff: bool,
}

/// Food item with its first restoration effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub id: ItemId,
    pub name: String,
    pub conjured: bool,
    pub effect_type: EffectType,
    pub value: String,
    pub value2: Option<String>,
    pub buff: bool,
}

impl ParsedItem {
    pub fn from_effect(item: &RawItem, effect: Effect) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            conjured: item.is_conjured(),
            effect_type: effect.effect_type,
            value: effect.value,
            value2: effect.value2,
            buff: effect.buff,
        }
    }

    /// True when either amount is a percentage of the resource pool.
    pub fn uses_percentage(&self) -> bool {
        self.value.contains('%') || self.value2.as_deref().is_some_and(|v| v.contains('%'))
    }
}
