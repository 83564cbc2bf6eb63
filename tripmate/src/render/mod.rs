//! Output side of the session: everything the user sees goes through a
//! [`Presenter`].

pub mod markdown;
mod terminal;

pub use terminal::{
    extract_urls, format_message, format_trip_detail, format_trip_list, TerminalPresenter,
};

use crate::models::{Role, Trip, TripDetail};

pub const UNTITLED_TRIP: &str = "Untitled trip";
pub const UNSPECIFIED_COUNTRY: &str = "Unspecified";
pub const UNKNOWN_DATE: &str = "?";
pub const NO_TRIPS_MESSAGE: &str = "You haven't saved any trips yet!";

/// Rendering capability handed to the planner session.
///
/// Implementations must not fail; output errors are swallowed or logged.
pub trait Presenter: Send + Sync {
    /// Show one message bubble attributed to `role`.
    fn render_message(&self, role: Role, text: &str);

    /// Show saved trips as cards. An empty slice renders the empty state.
    fn render_trip_list(&self, trips: &[Trip]);

    fn render_trip_detail(&self, detail: &TripDetail);

    /// Toggle the "thinking" indicator. Always called in `true`/`false` pairs.
    fn set_busy(&self, busy: bool);

    /// Out-of-band notice that is not part of the conversation.
    fn notify(&self, text: &str);
}

/// Card lines for a trip with placeholders for missing fields.
pub fn trip_card_lines(trip: &Trip) -> [String; 3] {
    let name = trip.name.as_deref().filter(|s| !s.is_empty()).unwrap_or(UNTITLED_TRIP);
    let country = trip
        .country
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNSPECIFIED_COUNTRY);
    let start = trip
        .start_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_DATE);
    let end = trip
        .end_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_DATE);

    [
        format!("#{} {name}", trip.id),
        format!("Country: {country}"),
        format!("Dates: {start} to {end}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_trip_card_placeholders() {
        let trip = Trip {
            id: 7,
            name: None,
            country: Some(String::new()),
            start_date: Some("2025-04-10".to_string()),
            end_date: None,
            created_at: Utc::now(),
        };

        assert_eq!(
            trip_card_lines(&trip),
            [
                "#7 Untitled trip".to_string(),
                "Country: Unspecified".to_string(),
                "Dates: 2025-04-10 to ?".to_string(),
            ]
        );
    }
}
