//! Effect merge (§4.11): combine every effect source an agent carries into
//! one effective modifier map.
//!
//! Sources -- sect, technique, weapon, auxiliary, each persona trait, spirit
//! animal, and every active temporary effect -- contribute at equal
//! priority. Numeric keys sum, list-typed (tag) keys union, boolean keys OR.
//! Grounded in the `structure_effects_at_location` pattern pattern of
//! folding one flat effect map per contributing source into a single result,
//! generalized here to the full source list above.

use cultivation_types::{Agent, EffectMap, EffectValue};

/// Merge a sequence of effect-source maps into one combined map, applying
/// the per-variant rule (sum / union / OR) on key collisions.
pub fn merge_effects<'a>(sources: impl IntoIterator<Item = &'a EffectMap>) -> EffectMap {
    let mut merged = EffectMap::new();
    for source in sources {
        for (key, value) in source {
            merged
                .entry(key.clone())
                .and_modify(|existing| combine_in_place(existing, value))
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

fn combine_in_place(existing: &mut EffectValue, incoming: &EffectValue) {
    match (existing, incoming) {
        (EffectValue::Number(current), EffectValue::Number(added)) => {
            *current += *added;
        }
        (EffectValue::Flag(current), EffectValue::Flag(other)) => {
            *current = *current || *other;
        }
        (EffectValue::Tags(current), EffectValue::Tags(other)) => {
            current.extend(other.iter().cloned());
        }
        // Mismatched variants under the same key cannot be reconciled by a
        // merge rule; the later source wins rather than panicking.
        (existing, incoming) => *existing = incoming.clone(),
    }
}

/// Recompute an agent's cached effect map from its declared sources and bump
/// its version counter. Call once per tick (temporary-effect windows can
/// expire even with no other source change) and whenever a source changes.
pub fn recompute_agent_effects(
    agent: &mut Agent,
    sect_effects: Option<&EffectMap>,
    technique_effects: Option<&EffectMap>,
    weapon_effects: Option<&EffectMap>,
    auxiliary_effects: Option<&EffectMap>,
    persona_effects: &EffectMap,
    spirit_animal_effects: Option<&EffectMap>,
    clock: u64,
) {
    let mut sources: Vec<&EffectMap> = Vec::new();
    if let Some(effects) = sect_effects {
        sources.push(effects);
    }
    if let Some(effects) = technique_effects {
        sources.push(effects);
    }
    if let Some(effects) = weapon_effects {
        sources.push(effects);
    }
    if let Some(effects) = auxiliary_effects {
        sources.push(effects);
    }
    sources.push(persona_effects);
    if let Some(effects) = spirit_animal_effects {
        sources.push(effects);
    }

    let active_temporary: Vec<&EffectMap> = agent
        .temporary_effects
        .iter()
        .filter(|effect| effect.active_at(clock))
        .map(|effect| &effect.effects)
        .collect();
    sources.extend(active_temporary);

    agent.cached_effects = merge_effects(sources);
    agent.bump_effects_version();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeSet;

    use cultivation_types::TemporaryEffect;
    use rust_decimal::Decimal;

    use super::*;

    fn make_agent() -> Agent {
        Agent {
            id: cultivation_types::AgentId::new(),
            name: String::from("Test"),
            sex: cultivation_types::Sex::Female,
            age_months: 0,
            max_lifespan_months: 100,
            realm: cultivation_types::Realm::Mortal,
            level: 0,
            experience: 0,
            position: (0, 0),
            weapon: None,
            auxiliary: None,
            technique: None,
            spirit_animal: None,
            inventory: std::collections::BTreeMap::new(),
            sect: None,
            relations: std::collections::BTreeMap::new(),
            known_regions: BTreeSet::new(),
            location: cultivation_types::LocationId::new(),
            short_term_objective: None,
            long_term_objective: None,
            nickname: None,
            event_ring: std::collections::VecDeque::new(),
            plan_queue: std::collections::VecDeque::new(),
            temporary_effects: Vec::new(),
            cached_effects: EffectMap::new(),
            effects_version: 0,
            thinking: String::new(),
            cooldowns: std::collections::BTreeMap::new(),
            alive: true,
            born_at_month: 0,
            died_at_month: None,
            generation: 0,
            parent_a: None,
            parent_b: None,
            personality: cultivation_types::Personality {
                curiosity: Decimal::ZERO,
                cooperation: Decimal::ZERO,
                aggression: Decimal::ZERO,
                risk_tolerance: Decimal::ZERO,
                industriousness: Decimal::ZERO,
                sociability: Decimal::ZERO,
                honesty: Decimal::ZERO,
                loyalty: Decimal::ZERO,
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn numeric_keys_sum_across_sources() {
        let mut a = EffectMap::new();
        a.insert(String::from("attack_power"), EffectValue::Number(Decimal::from(5)));
        let mut b = EffectMap::new();
        b.insert(String::from("attack_power"), EffectValue::Number(Decimal::from(3)));

        let merged = merge_effects([&a, &b]);
        assert_eq!(merged.get("attack_power"), Some(&EffectValue::Number(Decimal::from(8))));
    }

    #[test]
    fn tag_keys_union_across_sources() {
        let mut a = EffectMap::new();
        a.insert(
            String::from("legal_actions"),
            EffectValue::Tags(BTreeSet::from([String::from("hunt")])),
        );
        let mut b = EffectMap::new();
        b.insert(
            String::from("legal_actions"),
            EffectValue::Tags(BTreeSet::from([String::from("mine")])),
        );

        let merged = merge_effects([&a, &b]);
        let EffectValue::Tags(tags) = merged.get("legal_actions").expect("merged entry") else {
            panic!("expected tags");
        };
        assert!(tags.contains("hunt") && tags.contains("mine"));
    }

    #[test]
    fn boolean_keys_or_across_sources() {
        let mut a = EffectMap::new();
        a.insert(String::from("can_fly"), EffectValue::Flag(false));
        let mut b = EffectMap::new();
        b.insert(String::from("can_fly"), EffectValue::Flag(true));

        let merged = merge_effects([&a, &b]);
        assert_eq!(merged.get("can_fly"), Some(&EffectValue::Flag(true)));
    }

    #[test]
    fn expired_temporary_effects_are_excluded() {
        let mut agent = make_agent();
        let mut effects = EffectMap::new();
        effects.insert(String::from("speed"), EffectValue::Number(Decimal::from(1)));
        agent.temporary_effects.push(TemporaryEffect {
            source: String::from("talisman"),
            effects,
            start_month: 0,
            duration_months: 2,
        });

        let persona_effects = EffectMap::new();
        recompute_agent_effects(&mut agent, None, None, None, None, &persona_effects, None, 5);

        assert!(agent.cached_effects.get("speed").is_none());
        assert_eq!(agent.effects_version, 1);
    }

    #[test]
    fn active_temporary_effects_contribute() {
        let mut agent = make_agent();
        let mut effects = EffectMap::new();
        effects.insert(String::from("speed"), EffectValue::Number(Decimal::from(1)));
        agent.temporary_effects.push(TemporaryEffect {
            source: String::from("talisman"),
            effects,
            start_month: 0,
            duration_months: 10,
        });

        let persona_effects = EffectMap::new();
        recompute_agent_effects(&mut agent, None, None, None, None, &persona_effects, None, 5);

        assert_eq!(agent.cached_effects.get("speed"), Some(&EffectValue::Number(Decimal::from(1))));
    }
}
