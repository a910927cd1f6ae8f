//! Request and response bodies for the backend's JSON actions

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cache::CacheKey;
use crate::errors::{ApiError, ApiResult};

pub const ACTION_EXTRACT_RECEIPT: &str = "extractReceipt";
pub const ACTION_SAVE_RECEIPT: &str = "saveReceipt";

/// Fields read from a receipt, by OCR or by hand
///
/// OCR may miss any field, so all are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ReceiptFields {
    /// Whether every field was filled; otherwise the caller falls back to manual entry
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.vendor.is_some() && self.total.is_some() && self.category.is_some()
    }

    /// Parse `date` in the formats the backend produces
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?.trim();
        ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
    }
}

/// Accept totals as numbers or as strings like "$12.50" / "1,204.00"
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Amount>::deserialize(deserializer)? {
        Some(Amount::Number(n)) => Some(n),
        Some(Amount::Text(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        None => None,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReceiptRequest<'a> {
    pub action: &'static str,
    pub image_base64: &'a str,
}

impl<'a> ExtractReceiptRequest<'a> {
    pub fn new(image_base64: &'a str) -> Self {
        Self {
            action: ACTION_EXTRACT_RECEIPT,
            image_base64,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceiptRequest<'a> {
    pub action: &'static str,
    pub image_base64: &'a str,
    #[serde(flatten)]
    pub fields: &'a ReceiptFields,
}

impl<'a> SaveReceiptRequest<'a> {
    pub fn new(image_base64: &'a str, fields: &'a ReceiptFields) -> Self {
        Self {
            action: ACTION_SAVE_RECEIPT,
            image_base64,
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaveReceiptResponse {
    pub url: String,
}

/// A list or detail read, addressed by action name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceQuery {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceQuery {
    pub fn for_key(key: CacheKey<'_>) -> Self {
        let (action, name) = match key {
            CacheKey::ClientsList => ("getClients", None),
            CacheKey::EmployeesList => ("getEmployees", None),
            CacheKey::EmployeeEntries(name) => ("getEmployeeEntries", Some(name.to_string())),
            CacheKey::EmployeeInfo(name) => ("getEmployeeInfo", Some(name.to_string())),
            CacheKey::ReceiptsList => ("getReceipts", None),
            CacheKey::ExpensesData => ("getExpenses", None),
        };
        Self { action, name }
    }
}

/// `{ success, data, error }` wrapper used by every action
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self, action: &str) -> ApiResult<T> {
        if !self.success {
            return Err(ApiError::rejected(
                action,
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.data.ok_or_else(|| ApiError::MissingData {
            action: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_extract_request_shape() {
        let body = serde_json::to_value(ExtractReceiptRequest::new("/9j/4AAQ")).unwrap();
        assert_eq!(body, json!({"action": "extractReceipt", "imageBase64": "/9j/4AAQ"}));
    }

    #[test]
    fn test_save_request_flattens_fields() {
        let fields = ReceiptFields {
            date: Some("2026-03-14".to_string()),
            vendor: Some("Hardware Depot".to_string()),
            total: Some(42.5),
            category: None,
        };
        let body = serde_json::to_value(SaveReceiptRequest::new("abc", &fields)).unwrap();
        assert_eq!(
            body,
            json!({
                "action": "saveReceipt",
                "imageBase64": "abc",
                "date": "2026-03-14",
                "vendor": "Hardware Depot",
                "total": 42.5
            })
        );
    }

    #[rstest]
    #[case(json!(12.5), Some(12.5))]
    #[case(json!("$1,204.00"), Some(1204.0))]
    #[case(json!("n/a"), None)]
    #[case(json!(null), None)]
    fn test_lenient_total(#[case] total: serde_json::Value, #[case] expected: Option<f64>) {
        let fields: ReceiptFields = serde_json::from_value(json!({ "total": total })).unwrap();
        assert_eq!(fields.total, expected);
    }

    #[rstest]
    #[case("2026-03-14")]
    #[case("03/14/2026")]
    #[case("2026/03/14")]
    fn test_parsed_date(#[case] date: &str) {
        let fields = ReceiptFields {
            date: Some(date.to_string()),
            ..Default::default()
        };
        assert_eq!(fields.parsed_date(), NaiveDate::from_ymd_opt(2026, 3, 14));
    }

    #[test]
    fn test_is_complete() {
        let mut fields: ReceiptFields = serde_json::from_value(json!({
            "date": "2026-03-14", "vendor": "Cafe", "total": "8.20"
        }))
        .unwrap();
        assert!(!fields.is_complete());
        fields.category = Some("Meals".to_string());
        assert!(fields.is_complete());
    }

    #[test]
    fn test_envelope_results() {
        let ok: Envelope<SaveReceiptResponse> =
            serde_json::from_value(json!({"success": true, "data": {"url": "https://drive/x"}}))
                .unwrap();
        assert_eq!(ok.into_result("saveReceipt").unwrap().url, "https://drive/x");

        let rejected: Envelope<SaveReceiptResponse> =
            serde_json::from_value(json!({"success": false, "error": "quota"})).unwrap();
        assert!(matches!(
            rejected.into_result("saveReceipt"),
            Err(ApiError::Rejected { .. })
        ));

        let empty: Envelope<SaveReceiptResponse> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(
            empty.into_result("saveReceipt"),
            Err(ApiError::MissingData { .. })
        ));
    }

    #[test]
    fn test_resource_query_for_key() {
        assert_eq!(
            ResourceQuery::for_key(CacheKey::EmployeeEntries("Ana")),
            ResourceQuery {
                action: "getEmployeeEntries",
                name: Some("Ana".to_string())
            }
        );
        let body = serde_json::to_value(ResourceQuery::for_key(CacheKey::ClientsList)).unwrap();
        assert_eq!(body, json!({"action": "getClients"}));
    }
}
