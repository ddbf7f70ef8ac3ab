//! Render model for the PDF collaborator.
//!
//! The engine flattens a finalized document plus the business configuration
//! into one serializable structure; layout and pagination are entirely the
//! collaborator's job. Monetary fields are rounded to 2 decimals here since
//! this is display-bound output.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{BusinessConfig, Client, Document, money};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHeader {
    pub business_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Base64, same encoding as at rest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub logo_aspect_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMeta {
    pub number: String,
    #[serde(with = "crate::wire::date")]
    pub date: Option<NaiveDate>,
    #[serde(with = "crate::wire::date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRender {
    pub header: RenderHeader,
    pub document_meta: RenderMeta,
    pub client: Client,
    pub lines: Vec<RenderLine>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub notes: String,
}

impl DocumentRender {
    /// Flattens a document and the business configuration for rendering.
    pub fn build(document: &Document, config: &BusinessConfig) -> Self {
        Self {
            header: RenderHeader {
                business_name: config.business_name.clone(),
                address: config.address.clone(),
                phone: config.phone.clone(),
                email: config.email.clone(),
                logo: config.logo.as_ref().map(|bytes| STANDARD.encode(bytes)),
                logo_aspect_ratio: config.logo_aspect_ratio,
            },
            document_meta: RenderMeta {
                number: document.number.clone(),
                date: document.date,
                due_date: document.due_date,
            },
            client: document.client.clone(),
            lines: document
                .items
                .iter()
                .map(|item| RenderLine {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: money::round2(item.line_total()),
                })
                .collect(),
            subtotal: money::round2(document.subtotal),
            tax_amount: money::round2(document.tax_amount),
            total: money::round2(document.total),
            notes: document.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{DocumentKind, LineItem};

    #[test]
    fn build_flattens_document_and_config() {
        let mut config = BusinessConfig::default();
        config.business_name = "Nexus".to_string();
        config.set_logo(vec![1, 2, 3], 300, 100);

        let mut document = Document {
            id: Uuid::new_v4(),
            kind: DocumentKind::Invoice,
            number: "F-042".to_string(),
            date: "2024-03-01".parse().ok(),
            due_date: "2024-03-31".parse().ok(),
            client: Client {
                name: "Acme".to_string(),
                ..Client::default()
            },
            items: vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 50.0,
                tax_percent: 10.0,
            }],
            tax_percent: None,
            subtotal: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            notes: "Net 30".to_string(),
            method: "Cash".to_string(),
            created_at: Utc::now(),
            linked_movement_id: None,
        };
        document.recalc_totals();

        let render = DocumentRender::build(&document, &config);
        assert_eq!(render.header.business_name, "Nexus");
        assert_eq!(render.header.logo_aspect_ratio, 3.0);
        assert_eq!(render.lines.len(), 1);
        assert_eq!(render.lines[0].line_total, 100.0);
        assert_eq!(render.subtotal, 100.0);
        assert_eq!(render.tax_amount, 10.0);
        assert_eq!(render.total, 110.0);

        let value = serde_json::to_value(&render).unwrap();
        assert_eq!(value["documentMeta"]["number"], "F-042");
        assert_eq!(value["documentMeta"]["dueDate"], "2024-03-31");
        assert_eq!(value["lines"][0]["unitPrice"], 50.0);
        assert!(value["header"]["logo"].is_string());
    }
}
