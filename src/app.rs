use crate::api::ApiClient;
use crate::form::{Draft, FieldKind};
use crate::models::{Task, TodoList, User};
use crate::panel::{ResourcePanel, Tabular};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::io;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Users,
    Lists,
    Tasks,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Users, Tab::Lists, Tab::Tasks];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Users => User::TITLE,
            Tab::Lists => TodoList::TITLE,
            Tab::Tasks => Task::TITLE,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// The mounted panel. Exactly one exists at a time.
pub enum Screen {
    Users(ResourcePanel<User>),
    Lists(ResourcePanel<TodoList>),
    Tasks(ResourcePanel<Task>),
}

impl Screen {
    pub fn mount(tab: Tab, client: ApiClient) -> Self {
        match tab {
            Tab::Users => Screen::Users(ResourcePanel::mount(client)),
            Tab::Lists => Screen::Lists(ResourcePanel::mount(client)),
            Tab::Tasks => Screen::Tasks(ResourcePanel::mount(client)),
        }
    }

    pub fn pump(&mut self) -> usize {
        match self {
            Screen::Users(panel) => panel.pump(),
            Screen::Lists(panel) => panel.pump(),
            Screen::Tasks(panel) => panel.pump(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Insert,
}

pub struct App {
    client: ApiClient,
    pub active_tab: Tab,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub active_field: usize,
    pub date_format: String,
}

impl App {
    pub fn new(client: ApiClient, date_format: String) -> App {
        let screen = Screen::mount(Tab::Users, client.clone());
        App {
            client,
            active_tab: Tab::Users,
            screen,
            input_mode: InputMode::Normal,
            active_field: 0,
            date_format,
        }
    }

    /// Unmounts the current panel, discarding its state, and mounts a fresh
    /// one for `tab`. Selecting the active tab keeps the current panel.
    pub fn select_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        debug!(tab = tab.title(), "switching tab");
        self.active_tab = tab;
        self.screen = Screen::mount(tab, self.client.clone());
        self.input_mode = InputMode::Normal;
        self.active_field = 0;
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> io::Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        if self.input_mode == InputMode::Normal {
            let tab = match key.code {
                KeyCode::Char('q') => return Ok(true),
                KeyCode::Char('1') => Some(Tab::Users),
                KeyCode::Char('2') => Some(Tab::Lists),
                KeyCode::Char('3') => Some(Tab::Tasks),
                KeyCode::Tab => Some(self.active_tab.next()),
                KeyCode::BackTab => Some(self.active_tab.previous()),
                _ => None,
            };
            if let Some(tab) = tab {
                self.select_tab(tab);
                return Ok(false);
            }
        }

        let mode = &mut self.input_mode;
        let field = &mut self.active_field;
        match &mut self.screen {
            Screen::Users(panel) => handle_panel_key(panel, mode, field, key.code),
            Screen::Lists(panel) => handle_panel_key(panel, mode, field, key.code),
            Screen::Tasks(panel) => handle_panel_key(panel, mode, field, key.code),
        }
        Ok(false)
    }
}

fn handle_panel_key<R: Tabular>(
    panel: &mut ResourcePanel<R>,
    input_mode: &mut InputMode,
    active_field: &mut usize,
    code: KeyCode,
) {
    let fields = <R::Draft as Draft>::FIELDS;
    let is_text = |index: usize| matches!(fields[index].kind, FieldKind::Text { .. });

    match *input_mode {
        InputMode::Normal => match code {
            KeyCode::Char('j') | KeyCode::Down => panel.next(),
            KeyCode::Char('k') | KeyCode::Up => panel.previous(),
            KeyCode::Char('d') => panel.delete_selected(),
            KeyCode::Char(' ') => panel.toggle_selected(),
            KeyCode::Char('r') => panel.reload(),
            KeyCode::Char('a') => {
                *input_mode = InputMode::Editing;
                *active_field = 0;
            }
            _ => {}
        },

        InputMode::Editing => match code {
            KeyCode::Char('i') => {
                if is_text(*active_field) {
                    *input_mode = InputMode::Insert;
                }
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                *active_field = (*active_field + 1) % fields.len();
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                *active_field = (*active_field + fields.len() - 1) % fields.len();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                panel.draft.cycle(*active_field, &panel.references, true);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                panel.draft.cycle(*active_field, &panel.references, false);
            }
            KeyCode::Enter => {
                if panel.submit() {
                    *input_mode = InputMode::Normal;
                }
            }
            KeyCode::Esc => {
                *input_mode = InputMode::Normal;
            }
            _ => {}
        },

        InputMode::Insert => match code {
            KeyCode::Char(c) => {
                if let Some(text) = panel.draft.text_mut(*active_field) {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = panel.draft.text_mut(*active_field) {
                    text.pop();
                }
            }
            KeyCode::Tab => {
                *active_field = (*active_field + 1) % fields.len();
                *input_mode = InputMode::Editing;
            }
            KeyCode::Esc | KeyCode::Enter => {
                *input_mode = InputMode::Editing;
            }
            _ => {}
        },
    }
}
