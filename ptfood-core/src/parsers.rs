//! Item payload parsing and food effect extraction.

use crate::error::Result;
use crate::models::{Effect, EffectType, ParsedItem, RawItem, RawSpell};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FEAST_RE: Regex =
        Regex::new(r"(?i)Set out a .+? to feed|Feed up to [0-9]+ people").unwrap();
    static ref RESTORES_RE: Regex =
        Regex::new(r"(?i)Restores ([0-9,\.%]+) (health|mana)(?: and ([0-9,\.%]+) mana)?").unwrap();
    static ref BUFF_RE: Regex =
        Regex::new(r"(?i)If you spend at least [0-9]+ seconds eating you will become well fed.+")
            .unwrap();
}

/// Remove the single wrapping character on each side of an API body.
///
/// The item API returns JSON surrounded with parentheses.
pub fn strip_wrapping(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Extract the restoration effect of a single spell text, if any.
pub fn parse_spell_effect(text: &str) -> Option<Effect> {
    if FEAST_RE.is_match(text) {
        // Feasts are recognised but not categorised separately.
        tracing::debug!("Feast text detected: {}", text);
    }

    let caps = RESTORES_RE.captures(text)?;
    let value = caps.get(1)?.as_str().replace(',', "");

    let (effect_type, value2) = match caps.get(3) {
        Some(mana) => (EffectType::Combo, Some(mana.as_str().replace(',', ""))),
        None => (EffectType::from_resource(caps.get(2)?.as_str())?, None),
    };

    Some(Effect {
        effect_type,
        value,
        value2,
        buff: BUFF_RE.is_match(text),
    })
}

/// Find the effect of the first spell that restores health or mana.
///
/// Later spells are ignored even when they would also match.
pub fn extract_effect(spells: &[RawSpell]) -> Option<Effect> {
    spells.iter().find_map(|spell| parse_spell_effect(&spell.text))
}

/// Parse a raw item API body into a food item.
///
/// Returns `Ok(None)` when no spell text describes a restoration effect.
pub fn parse_item(text: &str) -> Result<Option<ParsedItem>> {
    let item: RawItem = serde_json::from_str(strip_wrapping(text))?;
    Ok(extract_effect(item.spells()).map(|effect| ParsedItem::from_effect(&item, effect)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PtFoodError;

    const BUFF_TEXT: &str = "Restores 7500 health and 7500 mana over 30 sec.  Must remain seated while eating.  If you spend at least 10 seconds eating you will become well fed and gain 18 Stamina and Spirit for 1 hour.";

    fn wrap(json: &str) -> String {
        format!("({})", json)
    }

    #[test]
    fn test_strip_wrapping() {
        assert_eq!(strip_wrapping("({\"a\":1})"), "{\"a\":1}");
        assert_eq!(strip_wrapping("x"), "");
        assert_eq!(strip_wrapping(""), "");
    }

    #[test]
    fn test_health_only() {
        let effect = parse_spell_effect("Restores 500 health over 21 sec.").unwrap();
        assert_eq!(effect.effect_type, EffectType::Health);
        assert_eq!(effect.value, "500");
        assert_eq!(effect.value2, None);
        assert!(!effect.buff);
    }

    #[test]
    fn test_mana_only() {
        let effect = parse_spell_effect("Restores 4,410 mana over 30 sec.").unwrap();
        assert_eq!(effect.effect_type, EffectType::Mana);
        assert_eq!(effect.value, "4410");
        assert_eq!(effect.value2, None);
    }

    #[test]
    fn test_combo_strips_commas() {
        let effect = parse_spell_effect("Restores 1,500 health and 375 mana over 18 sec.").unwrap();
        assert_eq!(effect.effect_type, EffectType::Combo);
        assert_eq!(effect.value, "1500");
        assert_eq!(effect.value2.as_deref(), Some("375"));
    }

    #[test]
    fn test_case_insensitive_match() {
        let effect = parse_spell_effect("RESTORES 61.2 Health over 18 sec.").unwrap();
        assert_eq!(effect.effect_type, EffectType::Health);
        assert_eq!(effect.value, "61.2");
    }

    #[test]
    fn test_percentage_amount_kept() {
        let effect = parse_spell_effect("Restores 50% health over 10 sec.").unwrap();
        assert_eq!(effect.value, "50%");
    }

    #[test]
    fn test_buff_detection() {
        assert!(parse_spell_effect(BUFF_TEXT).unwrap().buff);
        assert!(!parse_spell_effect("Restores 20 health and 20 mana").unwrap().buff);
    }

    #[test]
    fn test_buff_phrase_needs_trailing_text() {
        let text = "Restores 20 health. If you spend at least 10 seconds eating you will become well fed";
        assert!(!parse_spell_effect(text).unwrap().buff);
    }

    #[test]
    fn test_feast_text_without_restore() {
        assert!(parse_spell_effect("Set out a Great Feast to feed your party.").is_none());
    }

    #[test]
    fn test_first_matching_spell_wins() {
        let spells = vec![
            RawSpell { text: "Increases your Spirit by 5.".to_string() },
            RawSpell { text: "Restores 100 health.".to_string() },
            RawSpell { text: format!("Restores 900 mana. {}", &BUFF_TEXT[BUFF_TEXT.find("If").unwrap()..]) },
        ];
        let effect = extract_effect(&spells).unwrap();
        assert_eq!(effect.effect_type, EffectType::Health);
        assert_eq!(effect.value, "100");
        assert!(!effect.buff);
    }

    #[test]
    fn test_parse_item_full() {
        let body = wrap(&format!(
            r#"{{"ID":33004,"Name":"Clamlette Magnifique","Flags1":0,"Quality":1,"Spells":[{{"ID":45548,"Text":"{}"}}]}}"#,
            BUFF_TEXT
        ));
        let item = parse_item(&body).unwrap().unwrap();
        assert_eq!(item.id, 33004);
        assert_eq!(item.name, "Clamlette Magnifique");
        assert!(!item.conjured);
        assert_eq!(item.effect_type, EffectType::Combo);
        assert_eq!(item.value, "7500");
        assert_eq!(item.value2.as_deref(), Some("7500"));
        assert!(item.buff);
    }

    #[test]
    fn test_parse_item_conjured_flag() {
        let body = wrap(r#"{"ID":5349,"Name":"Conjured Muffin","Flags1":2,"Spells":[{"Text":"Restores 61 health over 18 sec."}]}"#);
        let item = parse_item(&body).unwrap().unwrap();
        assert!(item.conjured);

        let body = wrap(r#"{"ID":5350,"Name":"Conjured Water","Flags1":64,"Spells":[{"Text":"Restores 151 mana over 18 sec."}]}"#);
        let item = parse_item(&body).unwrap().unwrap();
        assert!(!item.conjured);
    }

    #[test]
    fn test_parse_item_without_spells() {
        let body = wrap(r#"{"ID":1,"Name":"Rock","Flags1":0,"Spells":[]}"#);
        assert!(parse_item(&body).unwrap().is_none());

        let body = wrap(r#"{"ID":1,"Name":"Rock","Flags1":0}"#);
        assert!(parse_item(&body).unwrap().is_none());

        let body = wrap(r#"{"ID":1,"Name":"Rock","Flags1":0,"Spells":null}"#);
        assert!(parse_item(&body).unwrap().is_none());
    }

    #[test]
    fn test_parse_item_unwrapped_body_fails() {
        let err = parse_item(r#"{"ID":1,"Name":"Rock","Flags1":0}"#).unwrap_err();
        assert!(matches!(err, PtFoodError::Serialization(_)));
    }

    #[test]
    fn test_parse_item_missing_fields_fails() {
        assert!(parse_item(&wrap(r#"{"Name":"Rock"}"#)).is_err());
    }
}
