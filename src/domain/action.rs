//! # Actions
//!
//! The validated unit of work produced from a classified command.
//! An `Action` can only be built through the validator or `Action::error`, and has no
//! setters, so the per-kind field rules hold for its whole lifetime.

use serde::Serialize;
use std::fmt;

/// Closed set of things the relay knows how to ask the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    EditFile,
    RunCode,
    SearchCode,
    OpenFile,
    ExecuteCommand,
    Error,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::CreateFile,
        ActionKind::EditFile,
        ActionKind::RunCode,
        ActionKind::SearchCode,
        ActionKind::OpenFile,
        ActionKind::ExecuteCommand,
        ActionKind::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateFile => "create_file",
            ActionKind::EditFile => "edit_file",
            ActionKind::RunCode => "run_code",
            ActionKind::SearchCode => "search_code",
            ActionKind::OpenFile => "open_file",
            ActionKind::ExecuteCommand => "execute_command",
            ActionKind::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == wanted)
    }

    /// Kinds that cannot be carried out without a file path.
    pub fn requires_target_path(&self) -> bool {
        matches!(self, ActionKind::CreateFile | ActionKind::OpenFile)
    }

    /// Kinds that cannot be carried out without an instruction payload.
    /// `open_file` may name only a path; `error` never carries one.
    pub fn requires_instruction(&self) -> bool {
        !matches!(self, ActionKind::OpenFile | ActionKind::Error)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    kind: ActionKind,
    instruction: Option<String>,
    description: String,
    target_path: Option<String>,
}

impl Action {
    /// Builds an `error` action. Blank descriptions are replaced so the
    /// description is never empty.
    pub fn error(description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.trim().is_empty() {
            "unspecified classification error".to_string()
        } else {
            description
        };
        Self {
            kind: ActionKind::Error,
            instruction: None,
            description,
            target_path: None,
        }
    }

    /// Only the validator calls this, after it has checked the per-kind rules.
    pub(crate) fn validated(
        kind: ActionKind,
        instruction: Option<String>,
        description: String,
        target_path: Option<String>,
    ) -> Self {
        debug_assert!(kind != ActionKind::Error);
        debug_assert!(!kind.requires_target_path() || target_path.is_some());
        debug_assert!(!kind.requires_instruction() || instruction.is_some());
        Self {
            kind,
            instruction,
            description,
            target_path,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.kind == ActionKind::Error
    }

    /// Text sent to the execution backend. Falls back to a sentence built
    /// from the path and description when the classifier gave no instruction.
    pub fn execution_request(&self) -> String {
        if let Some(instruction) = &self.instruction {
            return instruction.clone();
        }
        match (&self.kind, &self.target_path) {
            (ActionKind::OpenFile, Some(path)) => format!("Open the file {path}"),
            (_, Some(path)) => format!("{} ({path})", self.description),
            _ => self.description.clone(),
        }
    }
}
