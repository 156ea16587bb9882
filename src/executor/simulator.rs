use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::executor::collaborators::{AtomicActionExecutor, ScreenIdSource, SettleDetector};
use crate::executor::result::AtomicFailure;
use crate::graph::ui_map::SCREEN_ELEMENT_ID;
use crate::graph::{Intent, UiMap};
use crate::model::Trigger;

#[derive(Debug)]
struct Navigation {
    current: String,
    history: Vec<String>,
}

/// In-process stand-in for a device, driven by a semantic map.
///
/// Firing an element follows its intent for that trigger. Back intents pop
/// the navigation history; intents to screens outside the map leave the
/// device where it is.
#[derive(Debug)]
pub struct SimulatedDevice {
    map: Arc<UiMap>,
    nav: Mutex<Navigation>,
    settles: AtomicBool,
}

impl SimulatedDevice {
    pub fn new(map: Arc<UiMap>, start: &str) -> Self {
        Self {
            map,
            nav: Mutex::new(Navigation {
                current: start.to_string(),
                history: Vec::new(),
            }),
            settles: AtomicBool::new(true),
        }
    }

    /// Make every subsequent settle wait time out (or succeed again).
    pub fn set_settles(&self, settles: bool) {
        self.settles.store(settles, Ordering::SeqCst);
    }

    pub fn current(&self) -> Option<String> {
        self.nav.lock().ok().map(|n| n.current.clone())
    }

    pub fn history(&self) -> Vec<String> {
        self.nav
            .lock()
            .map(|n| n.history.clone())
            .unwrap_or_default()
    }

    fn follow(&self, nav: &mut Navigation, intent: &Intent) {
        if intent.has_unknown_destination() {
            if let Some(previous) = nav.history.pop() {
                nav.current = previous;
            }
        } else if self.map.contains(&intent.target_screen_id) {
            let from = std::mem::replace(&mut nav.current, intent.target_screen_id.clone());
            nav.history.push(from);
        }
        debug!(intent = %intent.intent_id, now = %nav.current, "Simulated transition");
    }
}

impl ScreenIdSource for SimulatedDevice {
    fn current_screen_id(&self) -> Option<String> {
        self.current()
    }
}

impl AtomicActionExecutor for SimulatedDevice {
    fn run(&self, element_id: &str, trigger: Trigger) -> Result<(), AtomicFailure> {
        let mut nav = self
            .nav
            .lock()
            .map_err(|_| AtomicFailure::ComponentNotInteractable)?;
        let screen = self
            .map
            .screen(&nav.current)
            .ok_or(AtomicFailure::ComponentNotFound)?;

        if element_id == SCREEN_ELEMENT_ID {
            match screen.intents.iter().find(|i| i.trigger() == trigger) {
                Some(intent) => self.follow(&mut nav, intent),
                None => {
                    if let Some(previous) = nav.history.pop() {
                        nav.current = previous;
                    }
                }
            }
            return Ok(());
        }

        let element = screen
            .element(element_id)
            .ok_or(AtomicFailure::ComponentNotFound)?;
        if !element.enabled {
            return Err(AtomicFailure::ComponentNotInteractable);
        }
        if !element.supports(trigger) {
            return Err(AtomicFailure::TriggerNotSupported);
        }

        if let Some(intent) = element.intents.iter().find(|i| i.trigger() == trigger) {
            self.follow(&mut nav, intent);
        }
        Ok(())
    }
}

impl SettleDetector for SimulatedDevice {
    fn wait_for_idle(&self) -> bool {
        self.settles.load(Ordering::SeqCst)
    }
}
