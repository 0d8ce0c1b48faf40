use crate::app::{App, InputMode, Screen, Tab};
use crate::form::{Draft, FieldKind};
use crate::panel::{ResourcePanel, Tabular};
use crossterm::event::{self, Event as CEvent};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn get_legend(input_mode: &InputMode, active_tab: Tab) -> Text<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Red));
    match input_mode {
        InputMode::Normal => {
            let mut spans = vec![
                key(" q "),
                Span::raw(": Quit "),
                key(" 1-3 "),
                Span::raw(": Switch Tab "),
                key(" j "),
                Span::raw(": Down "),
                key(" k "),
                Span::raw(": Up "),
                key(" a "),
                Span::raw(": Add "),
                key(" d "),
                Span::raw(": Delete "),
                key(" r "),
                Span::raw(": Reload "),
            ];
            if active_tab == Tab::Tasks {
                spans.push(key(" Space "));
                spans.push(Span::raw(": Toggle Done "));
            }
            Text::from(Line::from(spans))
        }
        InputMode::Editing => Text::from(Line::from(vec![
            key(" Tab "),
            Span::raw(": Next Field "),
            key(" i "),
            Span::raw(": Type "),
            key(" ←/→ "),
            Span::raw(": Choose "),
            key(" Enter "),
            Span::raw(": Submit "),
            key(" Esc "),
            Span::raw(": Back "),
        ])),
        InputMode::Insert => Text::from(Line::from(vec![
            key(" Esc "),
            Span::raw(": Stop Typing "),
            key(" Tab "),
            Span::raw(": Next Field "),
        ])),
    }
}

fn draw_form<R: Tabular>(
    f: &mut Frame,
    area: Rect,
    panel: &ResourcePanel<R>,
    input_mode: InputMode,
    active_field: usize,
) {
    let focused = input_mode != InputMode::Normal;
    let lines: Vec<Line> = <R::Draft as Draft>::FIELDS
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let value = panel.draft.value(index, &panel.references);
            let active = focused && index == active_field;
            let value = match field.kind {
                FieldKind::Choice => format!("< {} >", value),
                FieldKind::Text { .. } if active && input_mode == InputMode::Insert => {
                    format!("{}_", value)
                }
                FieldKind::Text { required: true, .. } if value.is_empty() => {
                    "(required)".to_string()
                }
                FieldKind::Text { .. } => value,
            };
            let name_style = if active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Line::from(vec![
                Span::styled(format!("{:>12}: ", field.name), name_style),
                Span::raw(value),
            ])
        })
        .collect();

    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Create New {}", R::TITLE.trim_end_matches('s')));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_table<R: Tabular>(
    f: &mut Frame,
    area: Rect,
    panel: &mut ResourcePanel<R>,
    date_format: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Existing {}", R::TITLE));

    if panel.loading {
        let placeholder = Paragraph::new("Loading...")
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(placeholder, area);
        return;
    }

    let header = Row::new(R::COLUMNS.iter().copied())
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = panel
        .collection
        .iter()
        .zip(panel.rows(date_format))
        .map(|(record, cells)| {
            let row = Row::new(cells);
            if record.completed() {
                row.style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                row
            }
        })
        .collect();

    let widths = R::COLUMNS.iter().map(|_| Constraint::Fill(1));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut panel.state);
}

fn draw_panel<R: Tabular>(
    f: &mut Frame,
    area: Rect,
    panel: &mut ResourcePanel<R>,
    input_mode: InputMode,
    active_field: usize,
    date_format: &str,
) {
    let form_height = <R::Draft as Draft>::FIELDS.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height), Constraint::Min(0)].as_ref())
        .split(area);

    draw_form(f, chunks[0], panel, input_mode, active_field);
    draw_table(f, chunks[1], panel, date_format);
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Tab bar, body and footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Todo List Management"),
        )
        .select(app.active_tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let mode = app.input_mode;
    let field = app.active_field;
    let date_format = app.date_format.as_str();
    match &mut app.screen {
        Screen::Users(panel) => draw_panel(f, chunks[1], panel, mode, field, date_format),
        Screen::Lists(panel) => draw_panel(f, chunks[1], panel, mode, field, date_format),
        Screen::Tasks(panel) => draw_panel(f, chunks[1], panel, mode, field, date_format),
    }

    // Render the legend in the footer
    let legend = Paragraph::new(get_legend(&app.input_mode, app.active_tab))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(legend, chunks[2]);
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        // Apply whatever responses arrived since the last frame
        app.screen.pump();

        terminal.draw(|f| draw(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                let should_quit = app.handle_input(key)?;
                if should_quit {
                    return Ok(());
                }
            }
        }
    }
}
