//! Action types for comparing synthesized templates

use crate::template::{Resource, Template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resource type used for template outputs in a plan
pub const OUTPUT_TYPE: &str = "output";

/// Represents a planned change to a single template entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "AWS::EC2::VPC", "output")
    pub resource_type: String,

    /// Logical id of the resource or name of the output
    pub logical_id: String,

    /// Description of the action
    pub description: String,

    /// Changed top-level property names (updates only)
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    fn new(
        action_type: ActionType,
        resource_type: impl Into<String>,
        logical_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let logical_id = logical_id.into();
        let description = format!("{} {} ({})", action_type, logical_id, resource_type);
        Self {
            action_type,
            resource_type,
            logical_id,
            description,
            details: HashMap::new(),
        }
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Plan containing all actions between two templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Compares a previously synthesized template with the desired one.
    ///
    /// A changed resource type cannot be updated in place and is planned
    /// as a delete followed by a create.
    pub fn between(previous: Option<&Template>, desired: &Template) -> Self {
        let empty = Template::new();
        let previous = previous.unwrap_or(&empty);
        let mut actions = Vec::new();

        for (logical_id, resource) in &desired.resources {
            match previous.resources.get(logical_id) {
                None => actions.push(Action::new(
                    ActionType::Create,
                    &resource.resource_type,
                    logical_id,
                )),
                Some(old) if old.resource_type != resource.resource_type => {
                    actions.push(Action::new(
                        ActionType::Delete,
                        &old.resource_type,
                        logical_id,
                    ));
                    actions.push(Action::new(
                        ActionType::Create,
                        &resource.resource_type,
                        logical_id,
                    ));
                }
                Some(old) => actions.push(compare_resource(logical_id, old, resource)),
            }
        }

        for (logical_id, old) in &previous.resources {
            if !desired.resources.contains_key(logical_id) {
                actions.push(Action::new(
                    ActionType::Delete,
                    &old.resource_type,
                    logical_id,
                ));
            }
        }

        for (name, output) in &desired.outputs {
            let action_type = match previous.outputs.get(name) {
                None => ActionType::Create,
                Some(old) if old == output => ActionType::NoOp,
                Some(_) => ActionType::Update,
            };
            actions.push(Action::new(action_type, OUTPUT_TYPE, name));
        }

        for name in previous.outputs.keys() {
            if !desired.outputs.contains_key(name) {
                actions.push(Action::new(ActionType::Delete, OUTPUT_TYPE, name));
            }
        }

        Self::new(actions)
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

fn compare_resource(logical_id: &str, old: &Resource, new: &Resource) -> Action {
    if old == new {
        return Action::new(ActionType::NoOp, &new.resource_type, logical_id);
    }

    let mut action = Action::new(ActionType::Update, &new.resource_type, logical_id);
    let empty = serde_json::Map::new();
    let old_props = old.properties.as_object().unwrap_or(&empty);
    let new_props = new.properties.as_object().unwrap_or(&empty);

    for (key, value) in new_props {
        if old_props.get(key) != Some(value) {
            action.details.insert(key.clone(), value.clone());
        }
    }
    for key in old_props.keys() {
        if !new_props.contains_key(key) {
            action.details.insert(key.clone(), serde_json::Value::Null);
        }
    }
    if old.depends_on != new.depends_on {
        action
            .details
            .insert("DependsOn".to_string(), serde_json::json!(new.depends_on));
    }
    action
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}
