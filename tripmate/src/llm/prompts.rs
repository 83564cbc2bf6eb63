//! Prompt templates for the model gateway.
//!
//! The trip extraction template is the wire contract between tripmate and the
//! structured endpoint: the field names below are exactly what
//! [`crate::models::TripProposal::into_plan`] reads back.

/// Build the instruction sent to the structured endpoint.
///
/// # Example
/// ```
/// use tripmate::llm::prompts::trip_extraction_prompt;
///
/// let prompt = trip_extraction_prompt("User: Plan a 3-day trip to Kyoto");
/// assert!(prompt.contains("Plan a 3-day trip to Kyoto"));
/// assert!(prompt.contains("\"dailyPlans\""));
/// ```
pub fn trip_extraction_prompt(context: &str) -> String {
    format!(
        r#"Based on the user's requests and the conversation below, produce a complete travel itinerary as JSON.

The root object must contain a "trip" object and a "dailyPlans" array.

"trip" contains:
- "name" (trip name, string)
- "country" (country, string)
- "startDate" (start date, 'YYYY-MM-DD' string)
- "endDate" (end date, 'YYYY-MM-DD' string)

"dailyPlans" contains one object per day. Each daily plan contains:
- "date" ('YYYY-MM-DD' string)
- "notes" (summary of the day, string, optional)
- "items" (array of trip items)

Each trip item contains:
- "name" (name, string)
- "type" (type, string, one of 'attraction', 'transport', 'lodging', 'food', 'other')
- "cost" (estimated cost, number, optional)
- "timeEstimate" (estimated time in hours, number, optional)
- "notes" (remarks, string, may include a website or image URL, optional)

Optional fields may be left empty or omitted when there is no reliable information.

User requests and conversation context:
---
{context}
---"#
    )
}
