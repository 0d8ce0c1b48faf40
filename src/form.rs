//! Creation drafts behind each panel's form.
//!
//! A draft holds what the user has typed so far. It only becomes a request
//! payload through [`Draft::to_payload`], which refuses incomplete input so
//! that no request is issued for it.

use crate::models::{Label, ListCreate, Priority, TaskCreate, UserCreate};
use crate::parser::parse_task_input;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text { required: bool, masked: bool },
    Choice,
}

#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    const fn text(name: &'static str, required: bool) -> Self {
        Field {
            name,
            kind: FieldKind::Text {
                required,
                masked: false,
            },
        }
    }

    const fn choice(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Choice,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("no {0} selected")]
    Unselected(&'static str),
}

pub trait Draft: Default + Clone + Send + 'static {
    type Payload;
    const FIELDS: &'static [Field];

    /// Text buffer behind a text field; `None` for choices.
    fn text_mut(&mut self, index: usize) -> Option<&mut String>;

    /// Steps a choice field through its options. `references` are the
    /// options of a foreign-key selector.
    fn cycle(&mut self, index: usize, references: &[Label], forward: bool);

    fn value(&self, index: usize, references: &[Label]) -> String;

    fn to_payload(&self) -> Result<Self::Payload, DraftError>;
}

fn required(value: &str, field: &'static str) -> Result<String, DraftError> {
    if value.trim().is_empty() {
        Err(DraftError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Next foreign-key selection. The unselected state sits before the first
/// reference, and an id no longer among `references` counts as unselected.
pub fn cycle_reference(current: Option<u64>, references: &[Label], forward: bool) -> Option<u64> {
    let slots = references.len() + 1;
    let position = current
        .and_then(|id| references.iter().position(|r| r.id == id))
        .map_or(0, |i| i + 1);
    let next = if forward {
        (position + 1) % slots
    } else {
        (position + slots - 1) % slots
    };

    next.checked_sub(1).map(|i| references[i].id)
}

fn reference_name(selected: Option<u64>, references: &[Label], placeholder: &str) -> String {
    selected
        .and_then(|id| references.iter().find(|r| r.id == id))
        .map_or_else(|| placeholder.to_string(), |r| r.name.clone())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserDraft {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Draft for UserDraft {
    type Payload = UserCreate;
    const FIELDS: &'static [Field] = &[
        Field::text("Email", true),
        Field::text("Username", true),
        Field {
            name: "Password",
            kind: FieldKind::Text {
                required: true,
                masked: true,
            },
        },
    ];

    fn text_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.email),
            1 => Some(&mut self.username),
            2 => Some(&mut self.password),
            _ => None,
        }
    }

    fn cycle(&mut self, _index: usize, _references: &[Label], _forward: bool) {}

    fn value(&self, index: usize, _references: &[Label]) -> String {
        match index {
            0 => self.email.clone(),
            1 => self.username.clone(),
            2 => "*".repeat(self.password.chars().count()),
            _ => String::new(),
        }
    }

    fn to_payload(&self) -> Result<UserCreate, DraftError> {
        Ok(UserCreate {
            email: required(&self.email, "Email")?,
            username: required(&self.username, "Username")?,
            password: required(&self.password, "Password")?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListDraft {
    pub name: String,
    pub description: String,
    pub user_id: Option<u64>,
}

impl Draft for ListDraft {
    type Payload = ListCreate;
    const FIELDS: &'static [Field] = &[
        Field::text("Name", true),
        Field::text("Description", false),
        Field::choice("Owner"),
    ];

    fn text_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.description),
            _ => None,
        }
    }

    fn cycle(&mut self, index: usize, references: &[Label], forward: bool) {
        if index == 2 {
            self.user_id = cycle_reference(self.user_id, references, forward);
        }
    }

    fn value(&self, index: usize, references: &[Label]) -> String {
        match index {
            0 => self.name.clone(),
            1 => self.description.clone(),
            2 => reference_name(self.user_id, references, "Select User"),
            _ => String::new(),
        }
    }

    fn to_payload(&self) -> Result<ListCreate, DraftError> {
        let user_id = self.user_id.ok_or(DraftError::Unselected("user"))?;
        Ok(ListCreate {
            name: required(&self.name, "Name")?,
            description: optional(&self.description),
            user_id,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub list_id: Option<u64>,
}

impl Draft for TaskDraft {
    type Payload = TaskCreate;
    const FIELDS: &'static [Field] = &[
        Field::text("Title", true),
        Field::text("Description", false),
        Field::choice("Priority"),
        Field::choice("List"),
    ];

    fn text_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.title),
            1 => Some(&mut self.description),
            _ => None,
        }
    }

    fn cycle(&mut self, index: usize, references: &[Label], forward: bool) {
        match index {
            2 if forward => self.priority = self.priority.next(),
            2 => self.priority = self.priority.previous(),
            3 => self.list_id = cycle_reference(self.list_id, references, forward),
            _ => {}
        }
    }

    fn value(&self, index: usize, references: &[Label]) -> String {
        match index {
            0 => self.title.clone(),
            1 => self.description.clone(),
            2 => self.priority.label().to_string(),
            3 => reference_name(self.list_id, references, "Select List"),
            _ => String::new(),
        }
    }

    /// The title may carry `!N` and `due:YYYY-MM-DD` shorthands; a `!N`
    /// marker wins over the priority selector.
    fn to_payload(&self) -> Result<TaskCreate, DraftError> {
        let list_id = self.list_id.ok_or(DraftError::Unselected("list"))?;
        let parsed = parse_task_input(&self.title);

        Ok(TaskCreate {
            title: required(&parsed.title, "Title")?,
            description: optional(&self.description),
            completed: false,
            priority: parsed.priority.unwrap_or(self.priority).level(),
            due_date: parsed
                .due_date
                .map(|date| date.format("%Y-%m-%dT00:00:00").to_string()),
            list_id,
        })
    }
}
