use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PlannerError, Result};

use super::{ItemMeasure, ItemType};

/// Decoded structured reply from the model: syntactically valid JSON whose
/// shape has not been checked yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TripProposal {
    root: Value,
}

impl TripProposal {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Decode raw model text. A surrounding markdown code fence is tolerated.
    pub fn decode(text: &str) -> Result<Self> {
        let body = strip_code_fence(text);
        serde_json::from_str(body).map(Self::from_value).map_err(|e| {
            tracing::error!(
                response_len = text.len(),
                response_preview = %text.chars().take(100).collect::<String>(),
                error = %e,
                "Structured response is not valid JSON"
            );
            PlannerError::Decode(e.to_string())
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Minimal shape check: a `trip` object and a `dailyPlans` array must be
    /// present. Nested fields are decoded leniently.
    pub fn into_plan(self) -> Result<TripPlan> {
        let Value::Object(mut root) = self.root else {
            return Err(PlannerError::IncompleteProposal(
                "response is not a JSON object".to_string(),
            ));
        };

        let trip = match root.remove("trip") {
            Some(value @ Value::Object(_)) => value,
            Some(_) => {
                return Err(PlannerError::IncompleteProposal(
                    "\"trip\" is not an object".to_string(),
                ))
            }
            None => {
                return Err(PlannerError::IncompleteProposal(
                    "missing \"trip\"".to_string(),
                ))
            }
        };

        let daily_plans = match root.remove("dailyPlans") {
            Some(value @ Value::Array(_)) => value,
            Some(_) => {
                return Err(PlannerError::IncompleteProposal(
                    "\"dailyPlans\" is not an array".to_string(),
                ))
            }
            None => {
                return Err(PlannerError::IncompleteProposal(
                    "missing \"dailyPlans\"".to_string(),
                ))
            }
        };

        let trip: TripDraft = serde_json::from_value(trip).map_err(|e| {
            PlannerError::IncompleteProposal(format!("unexpected \"trip\" fields: {e}"))
        })?;
        let daily_plans: Vec<DailyPlanDraft> = serde_json::from_value(daily_plans).map_err(|e| {
            PlannerError::IncompleteProposal(format!("unexpected \"dailyPlans\" entries: {e}"))
        })?;

        Ok(TripPlan { trip, daily_plans })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// Accept any JSON kind for a free-text field. Numbers and booleans are
/// stringified, a list of strings is joined line by line, and other values
/// keep their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(entries) if entries.iter().all(Value::is_string) => Some(
            entries
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    })
}

fn lenient_item_type<'de, D>(deserializer: D) -> std::result::Result<Option<ItemType>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.map(|label| ItemType::parse(&label)))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanDraft {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<TripItemDraft>>,
}

impl DailyPlanDraft {
    pub fn items(&self) -> &[TripItemDraft] {
        self.items.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripItemDraft {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_item_type")]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub cost: Option<ItemMeasure>,
    #[serde(default)]
    pub time_estimate: Option<ItemMeasure>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

/// A shape-checked proposal, ready to be committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub trip: TripDraft,
    pub daily_plans: Vec<DailyPlanDraft>,
}

impl TripPlan {
    pub fn item_count(&self) -> usize {
        self.daily_plans.iter().map(|plan| plan.items().len()).sum()
    }

    pub fn display_name(&self) -> &str {
        self.trip
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Untitled trip")
    }
}
