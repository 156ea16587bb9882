use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::UiMap;
use crate::semantic::matcher::{MatchProfile, matches};
use crate::semantic::target::{ComponentTarget, TargetSpec};

/// Known mismatches between resolver vocabulary and screen ids.
const SCREEN_ALIASES: &[(&str, &str)] = &[("Main", "MainActivity")];

/// How the candidate screens were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateSource {
    /// The target named or matched these screens
    Direct,
    /// The target named an alias of this screen
    Alias,
    /// Nothing matched; screens holding the fallback element were used
    FallbackElement,
    /// Nothing matched; every screen is a candidate
    AllScreens,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub screens: BTreeSet<String>,
    pub source: LocateSource,
}

/// Maps a [`TargetSpec`] to the screens that could satisfy it.
#[derive(Debug, Clone)]
pub struct TargetLocator {
    fallback_element_id: String,
}

impl Default for TargetLocator {
    fn default() -> Self {
        Self::new("btnNormal")
    }
}

impl TargetLocator {
    pub fn new(fallback_element_id: impl Into<String>) -> Self {
        Self {
            fallback_element_id: fallback_element_id.into(),
        }
    }

    /// Candidate target screens, falling back rather than coming up empty.
    /// Only an empty graph yields an empty set.
    pub fn locate(&self, map: &UiMap, target: &TargetSpec) -> Location {
        let location = match target {
            TargetSpec::StateTarget(state) => self.locate_state(map, &state.state_id),
            TargetSpec::ComponentTarget(component) => self.locate_component(map, component),
        };
        debug!(
            screens = ?location.screens,
            source = ?location.source,
            "Located target screens"
        );
        location
    }

    fn locate_state(&self, map: &UiMap, state_id: &str) -> Location {
        if map.contains(state_id) {
            return Location {
                screens: BTreeSet::from([state_id.to_string()]),
                source: LocateSource::Direct,
            };
        }
        let alias = SCREEN_ALIASES
            .iter()
            .find(|(name, _)| *name == state_id)
            .map(|(_, screen)| *screen)
            .filter(|screen| map.contains(screen));
        match alias {
            Some(screen) => Location {
                screens: BTreeSet::from([screen.to_string()]),
                source: LocateSource::Alias,
            },
            None => all_screens(map),
        }
    }

    fn locate_component(&self, map: &UiMap, target: &ComponentTarget) -> Location {
        let matched: BTreeSet<String> = map
            .states
            .iter()
            .filter(|(_, screen)| {
                screen
                    .elements
                    .iter()
                    .any(|e| matches(e, target, MatchProfile::Locator))
            })
            .map(|(id, _)| id.clone())
            .collect();
        if !matched.is_empty() {
            return Location {
                screens: matched,
                source: LocateSource::Direct,
            };
        }

        let fallback: BTreeSet<String> = map
            .states
            .iter()
            .filter(|(_, screen)| screen.element(&self.fallback_element_id).is_some())
            .map(|(id, _)| id.clone())
            .collect();
        if !fallback.is_empty() {
            return Location {
                screens: fallback,
                source: LocateSource::FallbackElement,
            };
        }

        all_screens(map)
    }
}

fn all_screens(map: &UiMap) -> Location {
    Location {
        screens: map.screen_ids().map(str::to_string).collect(),
        source: LocateSource::AllScreens,
    }
}
