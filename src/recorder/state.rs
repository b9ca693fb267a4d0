use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cursor::{CursorError, PositionCursor, ValueType};
use super::input::PendingInput;
use super::kind::RecordKind;
use super::values::MeasurementStore;
use crate::models::{ProblemReport, SessionParameters};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "view")]
pub enum SessionView {
    Parameters,
    Recording,
    #[serde(rename_all = "camelCase")]
    ProblemReport {
        subject: String,
    },
}

impl SessionView {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionView::Parameters => "Parameters",
            SessionView::Recording => "Recording",
            SessionView::ProblemReport { .. } => "ProblemReport",
        }
    }
}

impl Default for SessionView {
    fn default() -> Self {
        SessionView::Parameters
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while in the {view} view")]
    InvalidTransition {
        action: &'static str,
        view: &'static str,
    },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("no problem report at index {0}")]
    ProblemIndex(usize),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Which persisted slices an action touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub parameters: bool,
    pub values: bool,
    pub problems: bool,
    pub cursor: bool,
    pub view: bool,
}

impl Changes {
    pub const NONE: Changes = Changes {
        parameters: false,
        values: false,
        problems: false,
        cursor: false,
        view: false,
    };

    pub const ALL: Changes = Changes {
        parameters: true,
        values: true,
        problems: true,
        cursor: true,
        view: true,
    };

    pub fn view() -> Self {
        Self {
            view: true,
            ..Self::NONE
        }
    }

    pub fn cursor() -> Self {
        Self {
            cursor: true,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// In-memory recording session. Every mutating action reports the slices it
/// changed so the owner can write them to durable storage.
#[derive(Debug, Clone)]
pub struct SessionState<K: RecordKind> {
    pub view: SessionView,
    pub parameters: SessionParameters,
    pub cursor: K::Cursor,
    pub values: K::Values,
    pub problems: Vec<ProblemReport>,
    pub input: PendingInput,
}

impl<K: RecordKind> Default for SessionState<K> {
    fn default() -> Self {
        Self {
            view: SessionView::Parameters,
            parameters: SessionParameters::default(),
            cursor: K::Cursor::default(),
            values: K::Values::default(),
            problems: Vec::new(),
            input: PendingInput::default(),
        }
    }
}

impl<K: RecordKind> SessionState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_view(
        &self,
        action: &'static str,
        allowed: fn(&SessionView) -> bool,
    ) -> Result<(), SessionError> {
        if allowed(&self.view) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                view: self.view.as_str(),
            })
        }
    }

    pub fn set_parameters(&mut self, parameters: SessionParameters) -> Result<Changes, SessionError> {
        self.require_view("edit parameters", |view| matches!(view, SessionView::Parameters))?;
        self.parameters = parameters;
        Ok(Changes {
            parameters: true,
            ..Changes::NONE
        })
    }

    /// No field validation: empty parameters are allowed.
    pub fn start_recording(&mut self) -> Result<Changes, SessionError> {
        self.require_view("start recording", |view| matches!(view, SessionView::Parameters))?;
        self.view = SessionView::Recording;
        Ok(Changes::view())
    }

    pub fn back_to_parameters(&mut self) -> Result<Changes, SessionError> {
        self.require_view("edit parameters", |view| matches!(view, SessionView::Recording))?;
        self.view = SessionView::Parameters;
        Ok(Changes::view())
    }

    /// Captures the current position as the subject of the next report.
    pub fn report_problem(&mut self) -> Result<Changes, SessionError> {
        self.require_view("report a problem", |view| matches!(view, SessionView::Recording))?;
        self.view = SessionView::ProblemReport {
            subject: self.cursor.label(),
        };
        Ok(Changes::view())
    }

    pub fn add_problem(&mut self, description: &str, now: DateTime<Utc>) -> Result<Changes, SessionError> {
        let SessionView::ProblemReport { subject } = &self.view else {
            return Err(SessionError::InvalidTransition {
                action: "add a problem",
                view: self.view.as_str(),
            });
        };

        let description = description.trim();
        if description.is_empty() {
            return Err(SessionError::MissingField("description"));
        }

        self.problems
            .push(ProblemReport::new(subject.clone(), description.to_string(), now));
        Ok(Changes {
            problems: true,
            ..Changes::NONE
        })
    }

    pub fn delete_problem(&mut self, index: usize) -> Result<Changes, SessionError> {
        if index >= self.problems.len() {
            return Err(SessionError::ProblemIndex(index));
        }
        self.problems.remove(index);
        Ok(Changes {
            problems: true,
            ..Changes::NONE
        })
    }

    pub fn back_from_problems(&mut self) -> Result<Changes, SessionError> {
        self.require_view("leave problem reporting", |view| {
            matches!(view, SessionView::ProblemReport { .. })
        })?;
        self.view = SessionView::Recording;
        Ok(Changes::view())
    }

    pub fn input_key(&mut self, key: char) -> Changes {
        self.input.push(key);
        Changes::NONE
    }

    pub fn backspace(&mut self) -> Changes {
        self.input.backspace();
        Changes::NONE
    }

    pub fn clear_input(&mut self) -> Changes {
        self.input.clear();
        Changes::NONE
    }

    /// Stores the pending input at the current coordinate and value type.
    /// A buffer that does not parse is dropped silently and left as is.
    pub fn submit(&mut self) -> Result<Changes, SessionError> {
        self.require_view("submit a value", |view| matches!(view, SessionView::Recording))?;
        let Some(value) = self.input.parse() else {
            return Ok(Changes::NONE);
        };

        let at = self.cursor.coordinate();
        let value_type = self.cursor.value_type();
        let pair_completed = self.values.get(at, value_type.toggled()).is_some();

        self.values.set(at, value_type, Some(value));
        self.input.clear();
        self.cursor.after_submit(pair_completed);

        Ok(Changes {
            values: true,
            cursor: true,
            ..Changes::NONE
        })
    }

    pub fn delete_stored_value(&mut self) -> Result<Changes, SessionError> {
        self.require_view("delete a value", |view| matches!(view, SessionView::Recording))?;
        let at = self.cursor.coordinate();
        self.values.set(at, self.cursor.value_type(), None);
        Ok(Changes {
            values: true,
            ..Changes::NONE
        })
    }

    pub fn move_cursor(&mut self, movement: <K::Cursor as PositionCursor>::Move) -> Result<Changes, SessionError> {
        self.cursor.apply(movement)?;
        Ok(Changes::cursor())
    }

    pub fn toggle_value_type(&mut self) -> Changes {
        self.cursor.toggle_value_type();
        Changes::cursor()
    }

    pub fn set_value_type(&mut self, value_type: ValueType) -> Changes {
        self.cursor.set_value_type(value_type);
        Changes::cursor()
    }

    pub fn can_finish(&self) -> Result<(), SessionError> {
        self.require_view("finish", |view| matches!(view, SessionView::Recording))
    }

    /// Back to a blank session on the parameters screen.
    pub fn reset(&mut self) -> Changes {
        *self = Self::default();
        Changes::ALL
    }
}
