//! Document primitives: invoices and quotes.
//!
//! Both kinds share one structure; only invoices are ever projected into the
//! movement ledger. Totals are derived fields, recomputed from the line items
//! on every mutation and never trusted from input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, ValidationError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Quote,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Quote => "quote",
        }
    }
}

impl TryFrom<&str> for DocumentKind {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "invoice" => Ok(Self::Invoice),
            "quote" => Ok(Self::Quote),
            other => Err(ValidationError::new(
                "kind",
                format!("invalid document kind: {other}"),
            )),
        }
    }
}

/// The billed party. Only the name is mandatory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One priced line of a document. Tax is carried per line; a document-level
/// rate is just every line sharing the same value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "crate::wire::amount")]
    pub quantity: f64,
    #[serde(default, with = "crate::wire::amount")]
    pub unit_price: f64,
    #[serde(default, with = "crate::wire::amount")]
    pub tax_percent: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    fn is_blank(&self) -> bool {
        self.description.trim().is_empty() && self.quantity == 0.0 && self.unit_price == 0.0
    }
}

/// An invoice or quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    #[serde(default)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub number: String,
    #[serde(default, with = "crate::wire::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "crate::wire::date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub client: Client,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Shared rate recorded when the flat-rate entry path was used; the
    /// authoritative rates live on the items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<f64>,
    #[serde(default, with = "crate::wire::amount")]
    pub subtotal: f64,
    #[serde(default, with = "crate::wire::amount")]
    pub tax_amount: f64,
    #[serde(default, with = "crate::wire::amount")]
    pub total: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub method: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_movement_id: Option<Uuid>,
}

impl Document {
    /// Recomputes `subtotal`, `tax_amount` and `total` from the line items.
    ///
    /// Deterministic and idempotent: items are summed in stored order, so
    /// recalculating twice over the same items yields identical totals.
    pub fn recalc_totals(&mut self) {
        let mut subtotal = 0.0;
        let mut tax_amount = 0.0;
        for item in &self.items {
            let line = item.line_total();
            subtotal += line;
            tax_amount += line * item.tax_percent / 100.0;
        }
        self.subtotal = subtotal;
        self.tax_amount = tax_amount;
        self.total = subtotal + tax_amount;
    }
}

/// User input for creating or updating a document, before validation.
#[derive(Clone, Debug, Default)]
pub struct DocumentDraft {
    /// Target document. `None` creates; an unknown id also creates, keeping
    /// the supplied id.
    pub id: Option<Uuid>,
    pub kind: DocumentKind,
    pub number: String,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub client: Client,
    pub items: Vec<LineItem>,
    /// Flat-rate entry path: when set, the rate is stamped onto every line.
    pub tax_percent: Option<f64>,
    pub notes: String,
    pub method: String,
}

impl DocumentDraft {
    /// Drops fully-blank lines, applies the shared tax rate and zeroes any
    /// non-finite numbers. Runs before validation so a draft of only blank
    /// lines fails the `items` rule.
    pub(crate) fn normalize(&mut self) {
        self.items.retain(|item| !item.is_blank());
        for item in &mut self.items {
            if !item.quantity.is_finite() {
                item.quantity = 0.0;
            }
            if !item.unit_price.is_finite() {
                item.unit_price = 0.0;
            }
            if let Some(rate) = self.tax_percent {
                item.tax_percent = rate;
            }
            if !item.tax_percent.is_finite() {
                item.tax_percent = 0.0;
            }
        }
    }

    /// Field-level checks, first failure wins: `number`, then `client.name`,
    /// then `items`.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.number.trim().is_empty() {
            return Err(ValidationError::new("number", "document number must not be empty").into());
        }
        if self.client.name.trim().is_empty() {
            return Err(ValidationError::new("client.name", "client name must not be empty").into());
        }
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "at least one line item is required").into());
        }
        for item in &self.items {
            if item.quantity < 0.0 {
                return Err(ValidationError::new("items", "quantity must not be negative").into());
            }
            if item.unit_price < 0.0 {
                return Err(
                    ValidationError::new("items", "unit price must not be negative").into(),
                );
            }
            if item.tax_percent < 0.0 {
                return Err(ValidationError::new("items", "tax must not be negative").into());
            }
        }
        Ok(())
    }
}

/// Parses the bulk-entry format, one `qty | description | price` per line.
///
/// Blank lines are skipped. A line missing one of the three parts, or whose
/// quantity or price does not come out non-zero, is silently dropped rather
/// than reported; quantity and price fall back to 0 independently when they
/// fail to parse.
pub fn parse_items_from_text(text: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('|').map(str::trim).collect();
        if parts.len() < 3 {
            continue;
        }
        let quantity = crate::money::parse_amount(parts[0]);
        let unit_price = crate::money::parse_amount(parts[2]);
        if quantity == 0.0 || unit_price == 0.0 {
            continue;
        }
        items.push(LineItem {
            description: parts[1].to_string(),
            quantity,
            unit_price,
            tax_percent: 0.0,
        });
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_items(items: Vec<LineItem>) -> Document {
        Document {
            id: Uuid::new_v4(),
            kind: DocumentKind::Invoice,
            number: "F-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            due_date: None,
            client: Client {
                name: "Acme".to_string(),
                ..Client::default()
            },
            items,
            tax_percent: None,
            subtotal: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            notes: String::new(),
            method: "Cash".to_string(),
            created_at: Utc::now(),
            linked_movement_id: None,
        }
    }

    #[test]
    fn recalc_totals_per_line_tax() {
        let mut document = document_with_items(vec![
            LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 50.0,
                tax_percent: 10.0,
            },
            LineItem {
                description: "Gadget".to_string(),
                quantity: 1.0,
                unit_price: 30.0,
                tax_percent: 0.0,
            },
        ]);
        document.recalc_totals();
        assert_eq!(document.subtotal, 130.0);
        assert_eq!(document.tax_amount, 10.0);
        assert_eq!(document.total, 140.0);
    }

    #[test]
    fn recalc_totals_is_idempotent() {
        let mut document = document_with_items(vec![LineItem {
            description: "Widget".to_string(),
            quantity: 3.0,
            unit_price: 9.99,
            tax_percent: 7.0,
        }]);
        document.recalc_totals();
        let first = (document.subtotal, document.tax_amount, document.total);
        document.recalc_totals();
        assert_eq!(
            first,
            (document.subtotal, document.tax_amount, document.total)
        );
    }

    #[test]
    fn parse_items_drops_zero_quantity_and_zero_price_lines() {
        let items = parse_items_from_text("2 | Widget | 5\n0 | Bad | 5\n1 | Good | 0");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Widget");
        assert_eq!(items[0].quantity, 2.0);
        assert_eq!(items[0].unit_price, 5.0);
    }

    #[test]
    fn parse_items_accepts_comma_decimals_and_skips_short_lines() {
        let items = parse_items_from_text("2,5 | Hours | 40,00\n\nonly-two | parts\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2.5);
        assert_eq!(items[0].unit_price, 40.0);
    }

    #[test]
    fn normalize_drops_blank_lines_and_stamps_flat_rate() {
        let mut draft = DocumentDraft {
            number: "F-001".to_string(),
            items: vec![
                LineItem::default(),
                LineItem {
                    description: "Widget".to_string(),
                    quantity: 1.0,
                    unit_price: 10.0,
                    tax_percent: 0.0,
                },
            ],
            tax_percent: Some(21.0),
            ..DocumentDraft::default()
        };
        draft.normalize();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].tax_percent, 21.0);
    }

    #[test]
    fn validate_names_the_first_failing_field() {
        let mut draft = DocumentDraft::default();
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::new("number", "document number must not be empty").into()
        );

        draft.number = "F-001".to_string();
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::new("client.name", "client name must not be empty").into()
        );

        draft.client.name = "Acme".to_string();
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::new("items", "at least one line item is required").into()
        );
    }
}
