//! PeriodicTable food category tables and item categorization.

use crate::error::{PtFoodError, Result};
use crate::models::{EffectType, ParsedItem};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Lookup key: (conjured, effect type, well fed buff).
pub type CategoryKey = (bool, EffectType, bool);

/// Suffix shared by every mana-side category.
pub const MANA_SUFFIX: &str = ".Mana";

lazy_static! {
    pub static ref HEALTH_CATEGORIES: HashMap<CategoryKey, &'static str> = HashMap::from([
        ((true, EffectType::Combo, false), "MMM.Consumable.Food.Combo.Conjured"),
        ((true, EffectType::Health, false), "MMM.Consumable.Food.Basic.Conjured"),
        ((true, EffectType::Combo, true), "MMM.Consumable.Food.Buff.Combo.Conjured"),
        ((true, EffectType::Health, true), "MMM.Consumable.Food.Buff.Basic.Conjured"),
        ((false, EffectType::Combo, false), "MMM.Consumable.Food.Combo.Non-Conjured"),
        ((false, EffectType::Health, false), "MMM.Consumable.Food.Basic.Non-Conjured"),
        ((false, EffectType::Combo, true), "MMM.Consumable.Food.Buff.Combo.Non-Conjured"),
        ((false, EffectType::Health, true), "MMM.Consumable.Food.Buff.Basic.Non-Conjured"),
    ]);

    pub static ref MANA_CATEGORIES: HashMap<CategoryKey, &'static str> = HashMap::from([
        ((true, EffectType::Combo, false), "MMM.Consumable.Food.Combo.Conjured.Mana"),
        ((true, EffectType::Mana, false), "MMM.Consumable.Food.Basic.Conjured.Mana"),
        ((true, EffectType::Combo, true), "MMM.Consumable.Food.Buff.Combo.Conjured.Mana"),
        ((true, EffectType::Mana, true), "MMM.Consumable.Food.Buff.Basic.Conjured.Mana"),
        ((false, EffectType::Combo, false), "MMM.Consumable.Food.Combo.Non-Conjured.Mana"),
        ((false, EffectType::Mana, false), "MMM.Consumable.Food.Basic.Non-Conjured.Mana"),
        ((false, EffectType::Combo, true), "MMM.Consumable.Food.Buff.Combo.Non-Conjured.Mana"),
        ((false, EffectType::Mana, true), "MMM.Consumable.Food.Buff.Basic.Non-Conjured.Mana"),
    ]);
}

pub fn category_key(item: &ParsedItem) -> CategoryKey {
    (item.conjured, item.effect_type, item.buff)
}

/// Health-side and mana-side category for an item, in that order.
pub fn categories_for_item(item: &ParsedItem) -> (Option<&'static str>, Option<&'static str>) {
    let key = category_key(item);
    (
        HEALTH_CATEGORIES.get(&key).copied(),
        MANA_CATEGORIES.get(&key).copied(),
    )
}

/// Value written for an item within a category.
///
/// Combo items list their mana amount in `.Mana` categories. Percentages pass
/// through verbatim; other amounts are truncated to an integer.
pub fn item_value(item: &ParsedItem, category: &str) -> Result<String> {
    let value = match (&item.value2, item.effect_type) {
        (Some(mana), EffectType::Combo) if category.ends_with(MANA_SUFFIX) => mana,
        _ => &item.value,
    };

    if value.contains('%') {
        return Ok(value.clone());
    }

    let number: f64 = value.parse().map_err(|e| {
        PtFoodError::Parse(format!(
            "Invalid amount {:?} for item {} ({}): {}",
            value, item.id, item.name, e
        ))
    })?;
    if !(number.is_finite() && number.abs() < i64::MAX as f64) {
        return Err(PtFoodError::Parse(format!(
            "Amount {:?} for item {} ({}) is out of range",
            value, item.id, item.name
        )));
    }
    Ok(format!("{}", number.trunc() as i64))
}

/// Items grouped by category, keeping first-populated category order.
#[derive(Debug, Clone, Default)]
pub struct CategorizedItems {
    order: Vec<&'static str>,
    lists: HashMap<&'static str, Vec<ParsedItem>>,
}

impl CategorizedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: &'static str, item: ParsedItem) {
        let list = self.lists.entry(category).or_insert_with(|| {
            self.order.push(category);
            Vec::new()
        });
        list.push(item);
    }

    pub fn get(&self, category: &str) -> Option<&[ParsedItem]> {
        self.lists.get(category).map(Vec::as_slice)
    }

    /// Categories with their items, in the order they were first populated.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[ParsedItem])> + '_ {
        self.order
            .iter()
            .map(|category| (*category, self.lists[category].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Sort items into categories and collect the ones using percentage amounts.
pub fn categorize_items(items: &[ParsedItem]) -> (CategorizedItems, Vec<ParsedItem>) {
    let mut categorized = CategorizedItems::new();
    let mut percent_items = Vec::new();

    for item in items {
        if item.uses_percentage() {
            percent_items.push(item.clone());
        }

        let (health, mana) = categories_for_item(item);
        let memberships = [health, mana];
        if memberships.iter().all(Option::is_none) {
            tracing::debug!("Item {} ({}) matches no category", item.id, item.name);
        }
        for category in memberships.into_iter().flatten() {
            categorized.push(category, item.clone());
        }
    }

    (categorized, percent_items)
}
