use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::content::{AiActionTemplate, AiCatalog};
use crate::ecs::AiController;

/// Named actions from `ai.json`, indexed for controller composition.
#[derive(Debug, Default)]
pub struct BehaviorCatalog {
    actions: HashMap<String, AiActionTemplate>,
}

impl BehaviorCatalog {
    pub fn compile(catalog: &AiCatalog) -> Self {
        let mut actions = HashMap::with_capacity(catalog.actions.len());
        for action in &catalog.actions {
            if action.name.is_empty() {
                debug!(kind = %action.kind, "ai_action_without_name_skipped");
                continue;
            }
            if actions.insert(action.name.clone(), action.clone()).is_some() {
                debug!(action = %action.name, "ai_action_redefined");
            }
        }
        info!(action_count = actions.len(), "behavior_catalog_compiled");
        Self { actions }
    }

    pub fn get(&self, name: &str) -> Option<&AiActionTemplate> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Builds a controller from action names. Actions apply in ascending
    /// priority (stable) and the first action per behavior slot wins.
    /// Returns `None` when no name resolves.
    pub fn compose(&self, refs: &[String]) -> Option<AiController> {
        let mut actions: Vec<&AiActionTemplate> = refs
            .iter()
            .filter_map(|name| {
                let action = self.actions.get(name);
                if action.is_none() {
                    debug!(action = %name, "ai_action_reference_unknown");
                }
                action
            })
            .collect();
        if actions.is_empty() {
            return None;
        }
        actions.sort_by_key(|action| action.priority);

        let mut controller = AiController::default();
        for action in actions {
            match action.kind.trim().to_ascii_lowercase().as_str() {
                "follow" if controller.follow.is_none() => {
                    if let Some(follow) = parse_params(action) {
                        controller.set_follow(follow);
                    }
                }
                "pursue" if controller.pursue.is_none() => {
                    if let Some(pursue) = parse_params(action) {
                        controller.set_pursue(pursue);
                    }
                }
                "retreat" if controller.retreat.is_none() => {
                    if let Some(retreat) = parse_params(action) {
                        controller.set_retreat(retreat);
                    }
                }
                "patrol" if controller.patrol.is_none() => {
                    if let Some(patrol) = parse_params(action) {
                        controller.set_patrol(patrol);
                    }
                }
                "travel" if controller.travel.is_none() => {
                    if let Some(travel) = parse_params(action) {
                        controller.set_travel(travel);
                    }
                }
                "follow" | "pursue" | "retreat" | "patrol" | "travel" => {
                    debug!(action = %action.name, kind = %action.kind, "ai_action_slot_taken");
                }
                _ => {
                    debug!(action = %action.name, kind = %action.kind, "ai_action_type_skipped");
                }
            }
        }
        Some(controller)
    }
}

fn parse_params<T: DeserializeOwned + Default>(action: &AiActionTemplate) -> Option<T> {
    if action.params.is_null() {
        return Some(T::default());
    }
    match serde_json::from_value(action.params.clone()) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(action = %action.name, error = %error, "ai_action_params_invalid");
            None
        }
    }
}
