//! # Action Validator
//!
//! Turns clean classifier output into an `Action`. Never fails: anything that does not
//! satisfy the per-kind field rules comes back as an `error` action with a diagnostic description.
//! Code fences are the classifier adapter's job; this module only accepts bare JSON.

use serde_json::{Map, Value};

use crate::application::utils::excerpt;
use crate::domain::action::{Action, ActionKind};

const RAW_EXCERPT_CHARS: usize = 60;

pub fn validate(raw: &str) -> Action {
    // 1. Parse
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        _ => {
            return Action::error(format!(
                "malformed classifier output: {}",
                excerpt(raw.trim(), RAW_EXCERPT_CHARS)
            ));
        }
    };

    // 2. Kind
    let Some(kind_name) = field(&object, &["kind", "action"]) else {
        return Action::error("classifier output has no action kind");
    };
    let Some(kind) = ActionKind::from_str(&kind_name) else {
        return Action::error(format!("unknown action kind '{}'", excerpt(&kind_name, 30)));
    };

    let description = field(&object, &["description"]);
    if kind == ActionKind::Error {
        return Action::error(
            description.unwrap_or_else(|| "classifier could not interpret the command".into()),
        );
    }

    // 3. Per-kind required fields
    let instruction = field(&object, &["instruction", "command"]);
    let target_path = field(&object, &["target_path", "file_path"]);

    if kind.requires_target_path() && target_path.is_none() {
        return Action::error(format!("{kind} requires a target path"));
    }
    if kind.requires_instruction() && instruction.is_none() {
        return Action::error(format!("{kind} requires an instruction"));
    }
    let Some(description) = description else {
        return Action::error(format!("{kind} action has no description"));
    };

    // 4. Freeze
    Action::validated(kind, instruction, description, target_path)
}

/// First non-blank string value among `names`. Blank strings count as absent.
fn field(object: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        object
            .get(*name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
