use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::graph::transition_map::{
    ActionId, ActionMeta, Destination, ScreenIdx, TransitionMap, action_key,
};
use crate::graph::ui_map::{Intent, SCREEN_ELEMENT_ID, UiMap};

/// Derive the flat index document from a semantic graph.
///
/// Screens are numbered in id order. Every `(screen, element, trigger)`
/// triple that owns at least one intent becomes an action, numbered in
/// sorted order. Screen-level intents are bound to [`SCREEN_ELEMENT_ID`].
/// Back intents become [`Destination::Unknown`]; intents pointing at a
/// screen outside the map are dropped.
pub fn flatten(ui_map: &UiMap) -> TransitionMap {
    let page_index: BTreeMap<String, ScreenIdx> = ui_map
        .screen_ids()
        .enumerate()
        .map(|(i, id)| (id.to_string(), i as ScreenIdx))
        .collect();

    // (screen, element, trigger) -> (intents, visible text, element type)
    let mut grouped: BTreeMap<(String, String, String), (Vec<&Intent>, String, String)> =
        BTreeMap::new();

    for (screen_id, screen) in &ui_map.states {
        for intent in &screen.intents {
            let key = (
                screen_id.clone(),
                SCREEN_ELEMENT_ID.to_string(),
                intent.trigger().to_string(),
            );
            grouped
                .entry(key)
                .or_insert_with(|| (Vec::new(), String::new(), String::new()))
                .0
                .push(intent);
        }

        for element in &screen.elements {
            for intent in &element.intents {
                let key = (
                    screen_id.clone(),
                    element.element_id.clone(),
                    intent.trigger().to_string(),
                );
                grouped
                    .entry(key)
                    .or_insert_with(|| {
                        (
                            Vec::new(),
                            element.label().unwrap_or_default().to_string(),
                            element.kind.clone(),
                        )
                    })
                    .0
                    .push(intent);
            }
        }
    }

    let mut map = TransitionMap {
        page_index,
        ..TransitionMap::default()
    };

    for (id, ((screen_id, element_id, trigger), (intents, text, kind))) in
        grouped.into_iter().enumerate()
    {
        let action = id as ActionId;
        map.action_index
            .insert(action_key(&screen_id, &element_id, &trigger), action);
        map.action_metadata.insert(
            action,
            ActionMeta {
                page: screen_id.clone(),
                component_id: element_id,
                trigger_type: trigger,
                visible_text: text.clone(),
                view_type: kind,
            },
        );

        if !text.is_empty() {
            let ids = map.visible_text_index.entry(text).or_default();
            if !ids.contains(&action) {
                ids.push(action);
            }
        }

        let Some(source) = map.screen_index(&screen_id) else {
            continue;
        };
        if let Some(dest) = destination_for(&map.page_index, &intents) {
            map.transition
                .entry(source)
                .or_default()
                .insert(action, dest);
        }
    }

    debug!(
        screens = map.page_index.len(),
        actions = map.action_metadata.len(),
        "Flattened semantic map"
    );
    map
}

fn destination_for(
    page_index: &BTreeMap<String, ScreenIdx>,
    intents: &[&Intent],
) -> Option<Destination> {
    let mut concrete = BTreeSet::new();
    let mut unknown = false;

    for intent in intents {
        if intent.has_unknown_destination() {
            unknown = true;
        } else if let Some(idx) = page_index.get(&intent.target_screen_id) {
            concrete.insert(*idx);
        }
    }

    if !concrete.is_empty() {
        Some(Destination::Screens(concrete.into_iter().collect()))
    } else if unknown {
        Some(Destination::Unknown)
    } else {
        None
    }
}
