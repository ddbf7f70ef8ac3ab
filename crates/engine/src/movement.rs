//! Movement primitives.
//!
//! A `Movement` is a single dated cash event, either income or expense. It is
//! the unit every KPI aggregates over and the target of the invoice
//! projection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Income,
    Expense,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ValidationError::new(
                "kind",
                format!("invalid movement kind: {other}"),
            )),
        }
    }
}

/// A single cash event.
///
/// `date` is the economic calendar date and drives aggregation windows;
/// `created_at` only orders movements and breaks ties. A persisted record
/// with a bad `date` loads as `None` and simply falls out of every window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub kind: MovementKind,
    #[serde(default, with = "crate::wire::date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, with = "crate::wire::amount")]
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_document_id: Option<Uuid>,
}

/// User input for a manually entered movement, before validation. The kind
/// comes from the operation ([`income`]/[`expense`]), not the form.
///
/// [`income`]: crate::Ledger::income
/// [`expense`]: crate::Ledger::expense
#[derive(Clone, Debug, Default)]
pub struct MovementDraft {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub category: String,
    pub method: String,
    pub amount: f64,
}

impl MovementDraft {
    /// Checks every field the entry form requires; reports the first failure.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::new("description", "description must not be empty").into());
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::new("category", "category must not be empty").into());
        }
        if self.method.trim().is_empty() {
            return Err(ValidationError::new("method", "method must not be empty").into());
        }
        if self.date.is_none() {
            return Err(ValidationError::new("date", "date is required").into());
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::new("amount", "amount must be greater than zero").into());
        }
        Ok(())
    }
}

impl Movement {
    /// Builds a movement from a validated draft. The id and creation
    /// timestamp are assigned here.
    pub(crate) fn from_draft(kind: MovementKind, draft: MovementDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            date: draft.date,
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            method: draft.method.trim().to_string(),
            amount: draft.amount,
            created_at: Utc::now(),
            linked_document_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MovementDraft {
        MovementDraft {
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            description: "Sale".to_string(),
            category: "Sales".to_string(),
            method: "Cash".to_string(),
            amount: 100.0,
        }
    }

    #[test]
    fn validate_reports_first_failing_field() {
        let mut bad = draft();
        bad.description = String::new();
        bad.amount = 0.0;
        let err = bad.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::new("description", "description must not be empty").into()
        );
    }

    #[test]
    fn validate_rejects_zero_amount() {
        let mut bad = draft();
        bad.amount = 0.0;
        let err = bad.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::new("amount", "amount must be greater than zero").into()
        );
    }

    #[test]
    fn unparseable_date_deserializes_to_none() {
        let raw = r#"{
            "id": "6a6f1f89-2a57-4bbd-9b2a-96b423d2a0c1",
            "kind": "income",
            "date": "not-a-date",
            "description": "x",
            "category": "y",
            "method": "Cash",
            "amount": "12,5",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let movement: Movement = serde_json::from_str(raw).unwrap();
        assert_eq!(movement.date, None);
        assert_eq!(movement.amount, 12.5);
        assert_eq!(movement.linked_document_id, None);
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let movement = Movement::from_draft(MovementKind::Expense, draft());
        let value = serde_json::to_value(&movement).unwrap();
        assert_eq!(value["kind"], "expense");
        assert_eq!(value["date"], "2024-03-01");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("linkedDocumentId").is_none());
    }
}
