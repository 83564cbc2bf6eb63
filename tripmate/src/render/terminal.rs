use std::io::{self, Write};
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use url::Url;

use crate::models::{Role, Trip, TripDetail, TripItem};

use super::markdown::to_terminal_text;
use super::{trip_card_lines, Presenter, NO_TRIPS_MESSAGE};

const BUSY_INDICATOR: &str = "… thinking";
const UNNAMED_ITEM: &str = "Unnamed item";

/// Presenter that writes to a terminal (stdout by default).
///
/// The busy indicator goes to stderr so it never mixes with piped output.
pub struct TerminalPresenter {
    out: Mutex<Box<dyn Write + Send>>,
    show_busy: bool,
}

impl TerminalPresenter {
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            show_busy: true,
        }
    }

    /// Write everything to `writer` and suppress the busy indicator.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            show_busy: false,
        }
    }

    fn write_block(&self, block: &str) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!("Terminal writer lock poisoned");
            return;
        };
        if let Err(error) = writeln!(out, "{block}\n").and_then(|_| out.flush()) {
            tracing::warn!(error = %error, "Failed to write to terminal");
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render_message(&self, role: Role, text: &str) {
        // The terminal already shows what the user typed.
        if role == Role::User {
            return;
        }
        self.write_block(&format_message(role, text));
    }

    fn render_trip_list(&self, trips: &[Trip]) {
        self.write_block(&format_trip_list(trips));
    }

    fn render_trip_detail(&self, detail: &TripDetail) {
        self.write_block(&format_trip_detail(detail));
    }

    fn set_busy(&self, busy: bool) {
        if !self.show_busy {
            return;
        }
        let mut stderr = io::stderr();
        let result = if busy {
            write!(stderr, "{BUSY_INDICATOR}")
        } else {
            // Erase the indicator line.
            write!(stderr, "\r{}\r", " ".repeat(BUSY_INDICATOR.chars().count()))
        };
        if let Err(error) = result.and_then(|_| stderr.flush()) {
            tracing::warn!(error = %error, "Failed to update busy indicator");
        }
    }

    fn notify(&self, text: &str) {
        self.write_block(&format!("! {text}"));
    }
}

/// Role-prefixed message with markdown flattened and continuation lines
/// indented under the prefix.
pub fn format_message(role: Role, text: &str) -> String {
    let prefix = format!("{}: ", role.context_label());
    let indent = " ".repeat(prefix.chars().count());
    let body = to_terminal_text(text);

    let mut lines = body.lines();
    let mut rendered = format!("{prefix}{}", lines.next().unwrap_or_default());
    for line in lines {
        rendered.push('\n');
        if !line.is_empty() {
            rendered.push_str(&indent);
            rendered.push_str(line);
        }
    }
    rendered
}

pub fn format_trip_list(trips: &[Trip]) -> String {
    if trips.is_empty() {
        return NO_TRIPS_MESSAGE.to_string();
    }

    let mut rendered = format!("My trips ({})", trips.len());
    for trip in trips {
        let [title, country, dates] = trip_card_lines(trip);
        rendered.push_str(&format!("\n\n  {title}\n    {country}\n    {dates}"));
    }
    rendered
}

pub fn format_trip_detail(detail: &TripDetail) -> String {
    let [title, country, dates] = trip_card_lines(&detail.trip);
    let mut rendered = format!("{title}\n  {country}\n  {dates}");

    if detail.days.is_empty() {
        rendered.push_str("\n\n  No daily plans.");
        return rendered;
    }

    for (index, day) in detail.days.iter().enumerate() {
        let date = day.plan.date.as_deref().unwrap_or("date not set");
        rendered.push_str(&format!("\n\n  Day {} ({date})", index + 1));
        if !day.plan.notes.trim().is_empty() {
            rendered.push_str(&format!("\n    {}", day.plan.notes.trim()));
        }
        for item in &day.items {
            rendered.push_str(&format!("\n    - {}", format_item(item)));
            if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                rendered.push_str(&format!("\n        {}", notes.trim()));
            }
            for link in extract_urls(item.notes.as_deref().unwrap_or_default()) {
                rendered.push_str(&format!("\n        link: {link}"));
            }
        }
    }
    rendered
}

fn format_item(item: &TripItem) -> String {
    let mut line = item
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(UNNAMED_ITEM)
        .to_string();
    if let Some(item_type) = &item.item_type {
        line.push_str(&format!(" [{item_type}]"));
    }
    if let Some(cost) = &item.cost {
        line.push_str(&format!(", cost: {cost}"));
    }
    if let Some(time) = &item.time_estimate {
        line.push_str(&format!(", time: {time}"));
    }
    line
}

fn url_regex() -> Option<&'static Regex> {
    static URL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    URL_REGEX
        .get_or_init(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).ok())
        .as_ref()
}

/// Well-formed http(s) URLs mentioned in free text, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<Url> {
    let Some(regex) = url_regex() else {
        return Vec::new();
    };
    regex
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']))
        .filter_map(|candidate| Url::parse(candidate).ok())
        .collect()
}
