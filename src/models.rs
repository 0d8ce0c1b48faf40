use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// REST collections exposed by the todo service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Users,
    Lists,
    Tasks,
}

impl ResourceKind {
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Lists => "lists",
            ResourceKind::Tasks => "tasks",
        }
    }
}

/// A server-managed record with its own collection endpoint.
pub trait Resource: DeserializeOwned + Clone + Send + 'static {
    const KIND: ResourceKind;
    type Create: Serialize + Send + Sync + 'static;
    type Update: Serialize + Send + Sync + 'static;

    fn id(&self) -> u64;

    /// Text shown wherever another record refers to this one.
    fn label(&self) -> &str;
}

// Identity and display name of a cross-referenced record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub id: u64,
    pub name: String,
}

impl Label {
    pub fn of<R: Resource>(record: &R) -> Self {
        Label {
            id: record.id(),
            name: record.label().to_string(),
        }
    }
}

// User as returned by the server; the password is never echoed back
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::Users;
    type Create = UserCreate;
    type Update = UserUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.username
    }
}

// TodoList struct, owned by a user
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct TodoList {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ListCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: u64,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct ListUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for TodoList {
    const KIND: ResourceKind = ResourceKind::Lists;
    type Create = ListCreate;
    type Update = ListUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

// Task struct, belongs to a list
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: i64,
    pub due_date: Option<String>,
    pub list_id: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn priority(&self) -> Priority {
        Priority::from_level(self.priority)
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct TaskCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub list_id: u64,
}

#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Resource for Task {
    const KIND: ResourceKind = ResourceKind::Tasks;
    type Create = TaskCreate;
    type Update = TaskUpdate;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Anything outside 0..=3 is shown as `Low`.
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => Priority::Medium,
            2 => Priority::High,
            3 => Priority::Critical,
            _ => Priority::Low,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    pub fn next(self) -> Self {
        Priority::ALL[(self.level() as usize + 1) % Priority::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let len = Priority::ALL.len();
        Priority::ALL[(self.level() as usize + len - 1) % len]
    }
}

/// Renders a server timestamp as a calendar date, dropping the time of day.
///
/// The server emits naive datetimes, so offset-less values are accepted as
/// well as RFC 3339 ones.
pub fn format_date(raw: &str, format: &str) -> String {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

    // A format asking for time fields cannot render a bare date
    let mut rendered = String::new();
    match date.map(|date| write!(rendered, "{}", date.format(format))) {
        Some(Ok(())) => rendered,
        _ => "Invalid Date".to_string(),
    }
}
