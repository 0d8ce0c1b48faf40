use crate::models::Priority;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::OnceLock;

#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

fn priority_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!(\d+)\s*").expect("priority pattern"))
}

fn due_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bdue:(\S+)\s*").expect("due date pattern"))
}

fn spaces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

/// Pulls `!N` priority markers and a `due:YYYY-MM-DD` token out of a task title.
pub fn parse_task_input(input: &str) -> ParsedTask {
    let mut priority = None;

    // Priority
    for caps in priority_re().captures_iter(input) {
        if let Some(priority_match) = caps.get(1) {
            if let Ok(p) = priority_match.as_str().parse::<i64>() {
                if (0..=3).contains(&p) && priority.is_none() {
                    priority = Some(Priority::from_level(p));
                }
            }
        }
    }

    let title = priority_re().replace_all(input, "");

    // Due date; unparseable tokens stay in the title
    let mut due_date = None;
    let title = due_re().replace_all(&title, |caps: &Captures| {
        match NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
            Ok(date) => {
                due_date.get_or_insert(date);
                String::new()
            }
            Err(_) => caps[0].to_string(),
        }
    });

    let title = spaces_re().replace_all(&title, " ").trim().to_string();

    ParsedTask {
        title,
        priority,
        due_date,
    }
}
