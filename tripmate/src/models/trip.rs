use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category label of a trip item.
///
/// The model is asked for one of the fixed labels, but whatever it returns is
/// kept: unknown labels survive as [`ItemType::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    Attraction,
    Transport,
    Lodging,
    Food,
    Other,
    Unrecognized(String),
}

impl ItemType {
    pub const LABELS: [&'static str; 5] = ["attraction", "transport", "lodging", "food", "other"];

    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "attraction" | "景點" => Self::Attraction,
            "transport" | "transportation" | "交通" => Self::Transport,
            "lodging" | "accommodation" | "住宿" => Self::Lodging,
            "food" | "dining" | "餐飲" => Self::Food,
            "other" | "其他" => Self::Other,
            _ => Self::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Attraction => "attraction",
            Self::Transport => "transport",
            Self::Lodging => "lodging",
            Self::Food => "food",
            Self::Other => "other",
            Self::Unrecognized(label) => label,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ItemType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.as_str().to_string()
    }
}

/// A cost or time estimate as the model returned it.
///
/// Numbers stay numbers; free text such as `"about 2000 yen"` is kept verbatim.
/// Anything else (e.g. `{"amount": 3000, "currency": "JPY"}`) is kept as JSON
/// and stored as its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemMeasure {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl ItemMeasure {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) | Self::Other(_) => None,
        }
    }

    pub fn to_sql_value(&self) -> libsql::Value {
        match self {
            Self::Number(n) => libsql::Value::Real(*n),
            Self::Text(s) => libsql::Value::Text(s.clone()),
            Self::Other(value) => libsql::Value::Text(value.to_string()),
        }
    }

    pub fn from_sql_value(value: libsql::Value) -> Option<Self> {
        match value {
            libsql::Value::Integer(i) => Some(Self::Number(i as f64)),
            libsql::Value::Real(r) => Some(Self::Number(r)),
            libsql::Value::Text(s) => Some(Self::Text(s)),
            libsql::Value::Null | libsql::Value::Blob(_) => None,
        }
    }
}

impl std::fmt::Display for ItemMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub id: i64,
    pub trip_id: i64,
    pub date: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripItem {
    pub id: i64,
    pub daily_plan_id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
    pub cost: Option<ItemMeasure>,
    pub time_estimate: Option<ItemMeasure>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A daily plan together with its items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPlanDetail {
    pub plan: DailyPlan,
    pub items: Vec<TripItem>,
}

/// A stored trip with everything it owns, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDetail {
    pub trip: Trip,
    pub days: Vec<DailyPlanDetail>,
}

impl TripDetail {
    pub fn item_count(&self) -> usize {
        self.days.iter().map(|day| day.items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_known_labels() {
        assert_eq!(ItemType::parse("attraction"), ItemType::Attraction);
        assert_eq!(ItemType::parse(" Food "), ItemType::Food);
        assert_eq!(ItemType::parse("LODGING"), ItemType::Lodging);
    }

    #[test]
    fn test_item_type_legacy_aliases() {
        assert_eq!(ItemType::parse("景點"), ItemType::Attraction);
        assert_eq!(ItemType::parse("交通"), ItemType::Transport);
        assert_eq!(ItemType::parse("住宿"), ItemType::Lodging);
        assert_eq!(ItemType::parse("餐飲"), ItemType::Food);
        assert_eq!(ItemType::parse("其他"), ItemType::Other);
    }

    #[test]
    fn test_item_type_unknown_label_is_preserved() {
        let parsed = ItemType::parse("shopping");
        assert_eq!(parsed, ItemType::Unrecognized("shopping".to_string()));
        assert_eq!(parsed.as_str(), "shopping");
    }

    #[test]
    fn test_item_type_serde() {
        let parsed: ItemType = serde_json::from_str("\"transport\"").unwrap();
        assert_eq!(parsed, ItemType::Transport);
        assert_eq!(serde_json::to_string(&ItemType::Food).unwrap(), "\"food\"");
    }

    #[test]
    fn test_item_measure_accepts_numbers_and_text() {
        let number: ItemMeasure = serde_json::from_str("1500").unwrap();
        assert_eq!(number, ItemMeasure::Number(1500.0));
        assert_eq!(number.to_string(), "1500");

        let text: ItemMeasure = serde_json::from_str("\"about 2 hours\"").unwrap();
        assert_eq!(text, ItemMeasure::Text("about 2 hours".to_string()));
        assert_eq!(text.as_number(), None);
    }

    #[test]
    fn test_item_measure_keeps_structured_values_as_json() {
        let measure: ItemMeasure =
            serde_json::from_str(r#"{"amount":3000,"currency":"JPY"}"#).unwrap();

        assert_eq!(
            measure,
            ItemMeasure::Other(serde_json::json!({"amount": 3000, "currency": "JPY"}))
        );
        assert_eq!(measure.as_number(), None);
        assert!(matches!(
            measure.to_sql_value(),
            libsql::Value::Text(ref text) if text == r#"{"amount":3000,"currency":"JPY"}"#
        ));
        assert_eq!(measure.to_string(), r#"{"amount":3000,"currency":"JPY"}"#);
    }

    #[test]
    fn test_item_measure_sql_values() {
        assert_eq!(
            ItemMeasure::from_sql_value(libsql::Value::Integer(3)),
            Some(ItemMeasure::Number(3.0))
        );
        assert_eq!(
            ItemMeasure::from_sql_value(libsql::Value::Text("free".to_string())),
            Some(ItemMeasure::Text("free".to_string()))
        );
        assert_eq!(ItemMeasure::from_sql_value(libsql::Value::Null), None);
    }
}
