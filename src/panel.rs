//! The resource panel: one screen's worth of state for a single collection.
//!
//! Every request a panel makes runs on its own tokio task and reports back
//! over the panel's private channel. Mutations never touch `collection`
//! directly; they are always followed by a reload of the whole collection.
//! Dropping the panel drops the receiver, so responses that arrive after an
//! unmount are discarded by the failing send.

use crate::api::{ApiClient, ApiError};
use crate::form::Draft;
use crate::models::{
    format_date, Label, Resource, ResourceKind, Task, TaskUpdate, TodoList, User,
};
use ratatui::widgets::TableState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Per-resource panel configuration: columns, cross reference and draft.
pub trait Tabular: Resource {
    type Draft: Draft<Payload = Self::Create>;

    const TITLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Collection loaded alongside this one to resolve a foreign key.
    const REFERENCE: Option<ResourceKind> = None;

    fn cells(&self, references: &[Label], date_format: &str) -> Vec<String>;

    /// Update that flips this record's completion flag, if it has one.
    fn toggled(&self) -> Option<Self::Update> {
        None
    }

    fn completed(&self) -> bool {
        false
    }
}

/// Linear lookup of a cross-referenced label.
pub fn resolve(references: &[Label], id: u64) -> &str {
    references
        .iter()
        .find(|r| r.id == id)
        .map_or(UNKNOWN, |r| r.name.as_str())
}

pub fn or_not_available(text: Option<&str>) -> &str {
    match text {
        Some(text) if !text.is_empty() => text,
        _ => NOT_AVAILABLE,
    }
}

impl Tabular for User {
    type Draft = crate::form::UserDraft;

    const TITLE: &'static str = "Users";
    const COLUMNS: &'static [&'static str] = &["ID", "Email", "Username", "Created"];

    fn cells(&self, _references: &[Label], date_format: &str) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.email.clone(),
            self.username.clone(),
            format_date(&self.created_at, date_format),
        ]
    }
}

impl Tabular for TodoList {
    type Draft = crate::form::ListDraft;

    const TITLE: &'static str = "Lists";
    const COLUMNS: &'static [&'static str] =
        &["ID", "Name", "Description", "Owner", "Created"];
    const REFERENCE: Option<ResourceKind> = Some(ResourceKind::Users);

    fn cells(&self, references: &[Label], date_format: &str) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_not_available(self.description.as_deref()).to_string(),
            resolve(references, self.user_id).to_string(),
            format_date(&self.created_at, date_format),
        ]
    }
}

impl Tabular for Task {
    type Draft = crate::form::TaskDraft;

    const TITLE: &'static str = "Tasks";
    const COLUMNS: &'static [&'static str] = &[
        "Status",
        "Title",
        "Description",
        "Priority",
        "List",
        "Due",
        "Created",
    ];
    const REFERENCE: Option<ResourceKind> = Some(ResourceKind::Lists);

    fn cells(&self, references: &[Label], date_format: &str) -> Vec<String> {
        let due = match &self.due_date {
            Some(due) => format_date(due, date_format),
            None => NOT_AVAILABLE.to_string(),
        };
        vec![
            if self.completed { "[x]" } else { "[ ]" }.to_string(),
            self.title.clone(),
            or_not_available(self.description.as_deref()).to_string(),
            self.priority().label().to_string(),
            resolve(references, self.list_id).to_string(),
            due,
            format_date(&self.created_at, date_format),
        ]
    }

    fn toggled(&self) -> Option<TaskUpdate> {
        Some(TaskUpdate {
            completed: Some(!self.completed),
            ..Default::default()
        })
    }

    fn completed(&self) -> bool {
        self.completed
    }
}

/// Outcome of a spawned request, delivered back to the panel that issued it.
#[derive(Debug)]
pub enum PanelEvent<R> {
    Loaded {
        initial: bool,
        result: Result<Vec<R>, ApiError>,
    },
    References(Result<Vec<Label>, ApiError>),
    Created(Result<R, ApiError>),
    Deleted {
        id: u64,
        result: Result<(), ApiError>,
    },
    Toggled {
        id: u64,
        result: Result<R, ApiError>,
    },
}

pub struct ResourcePanel<R: Tabular> {
    client: ApiClient,
    pub collection: Vec<R>,
    pub references: Vec<Label>,
    pub draft: R::Draft,
    pub loading: bool,
    pub state: TableState,
    tx: UnboundedSender<PanelEvent<R>>,
    rx: UnboundedReceiver<PanelEvent<R>>,
}

impl<R: Tabular> ResourcePanel<R> {
    /// Creates the panel and starts its initial load, plus the cross
    /// reference load for panels that have one.
    pub fn mount(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let panel = ResourcePanel {
            client,
            collection: Vec::new(),
            references: Vec::new(),
            draft: R::Draft::default(),
            loading: true,
            state: TableState::default(),
            tx,
            rx,
        };

        debug!(resource = R::KIND.path(), "mounting panel");
        panel.spawn_load(true);
        if let Some(kind) = R::REFERENCE {
            panel.spawn_references(kind);
        }
        panel
    }

    fn spawn_load(&self, initial: bool) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.list_all::<R>().await;
            let _ = tx.send(PanelEvent::Loaded { initial, result });
        });
    }

    fn spawn_references(&self, kind: ResourceKind) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.labels(kind).await;
            let _ = tx.send(PanelEvent::References(result));
        });
    }

    /// Refetches the collection without entering the loading state.
    pub fn reload(&self) {
        self.spawn_load(false);
    }

    /// Sends the draft to the server. Returns `false`, issuing no request,
    /// when the draft is incomplete.
    pub fn submit(&self) -> bool {
        let payload = match self.draft.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                debug!(resource = R::KIND.path(), "not submitting draft: {}", err);
                return false;
            }
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.create::<R>(&payload).await;
            let _ = tx.send(PanelEvent::Created(result));
        });
        true
    }

    pub fn delete(&self, id: u64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete::<R>(id).await;
            let _ = tx.send(PanelEvent::Deleted { id, result });
        });
    }

    pub fn delete_selected(&self) {
        if let Some(record) = self.selected() {
            self.delete(record.id());
        }
    }

    /// Flips the completion flag of `record` on the server. The row only
    /// changes once the following reload resolves.
    pub fn toggle(&self, record: &R) {
        let Some(update) = record.toggled() else {
            return;
        };
        let id = record.id();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.update::<R>(id, &update).await;
            let _ = tx.send(PanelEvent::Toggled { id, result });
        });
    }

    pub fn toggle_selected(&self) {
        if let Some(record) = self.selected() {
            self.toggle(record);
        }
    }

    pub fn selected(&self) -> Option<&R> {
        self.state.selected().and_then(|i| self.collection.get(i))
    }

    pub fn next(&mut self) {
        if self.collection.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.collection.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.collection.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.collection.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn rows(&self, date_format: &str) -> Vec<Vec<String>> {
        self.collection
            .iter()
            .map(|record| record.cells(&self.references, date_format))
            .collect()
    }

    /// Applies every result that has already arrived. Never waits.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next result and applies it.
    pub async fn next_event(&mut self) {
        if let Some(event) = self.rx.recv().await {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: PanelEvent<R>) {
        let resource = R::KIND.path();
        match event {
            PanelEvent::Loaded { initial, result } => {
                if initial {
                    self.loading = false;
                }
                match result {
                    Ok(records) => {
                        debug!(resource, count = records.len(), "collection loaded");
                        self.collection = records;
                        self.clamp_selection();
                    }
                    Err(err) => error!(resource, "Error fetching {}: {}", resource, err),
                }
            }
            PanelEvent::References(result) => match result {
                Ok(labels) => self.references = labels,
                Err(err) => error!(resource, "Error fetching cross references: {}", err),
            },
            PanelEvent::Created(result) => match result {
                Ok(record) => {
                    info!(resource, id = record.id(), "record created");
                    self.draft = R::Draft::default();
                    self.reload();
                }
                Err(err) => error!(resource, "Error creating record: {}", err),
            },
            PanelEvent::Deleted { id, result } => {
                if let Err(err) = result {
                    error!(resource, id, "Error deleting record: {}", err);
                }
                self.reload();
            }
            PanelEvent::Toggled { id, result } => match result {
                Ok(_) => self.reload(),
                Err(err) => error!(resource, id, "Error updating record: {}", err),
            },
        }
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.state.selected(), self.collection.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(list_id: u64, description: Option<&str>) -> Task {
        Task {
            id: 1,
            title: "Write docs".to_string(),
            description: description.map(str::to_string),
            completed: false,
            priority: 9,
            due_date: None,
            list_id,
            created_at: "2024-01-15T10:00:00".to_string(),
            updated_at: "2024-01-15T10:00:00".to_string(),
        }
    }

    #[test]
    fn test_unknown_list_and_missing_description() {
        let references = vec![Label {
            id: 3,
            name: "Chores".to_string(),
        }];
        let cells = task(42, Some("")).cells(&references, "%Y-%m-%d");
        assert_eq!(
            cells,
            vec!["[ ]", "Write docs", "N/A", "Low", "Unknown", "N/A", "2024-01-15"]
        );

        let cells = task(3, Some("by friday")).cells(&references, "%Y-%m-%d");
        assert_eq!(cells[2], "by friday");
        assert_eq!(cells[4], "Chores");
    }

    #[test]
    fn test_task_toggle_only_sets_completed() {
        let mut record = task(3, None);
        assert_eq!(
            record.toggled(),
            Some(TaskUpdate {
                completed: Some(true),
                ..Default::default()
            })
        );
        record.completed = true;
        assert_eq!(record.toggled().and_then(|u| u.completed), Some(false));
    }

    #[test]
    fn test_users_have_no_toggle_or_reference() {
        let user = User {
            id: 2,
            email: "a@b.com".to_string(),
            username: "alice".to_string(),
            created_at: "2024-01-15T10:00:00".to_string(),
            updated_at: "2024-01-15T10:00:00".to_string(),
        };
        assert_eq!(user.toggled(), None);
        assert_eq!(User::REFERENCE, None);
        assert_eq!(user.cells(&[], "%Y-%m-%d")[2], "alice");
    }
}
