//! Invoice-to-movement projection.
//!
//! Every invoice materializes as exactly one income movement whose amount
//! mirrors the invoice total. The movement is a cached derived value, not an
//! independent source of truth: the document save path re-runs [`project`]
//! after every edit, and document deletion runs [`unproject`].

use uuid::Uuid;

use crate::{Document, Movement, MovementKind};

/// Category label stamped on every projected movement.
pub const PROJECTION_CATEGORY: &str = "Invoicing";

/// Creates or refreshes the movement mirroring `document`.
///
/// Looks the movement up by its back-reference; a dangling
/// `linked_movement_id` therefore just means "unlinked" and a fresh movement
/// is created instead of failing. The movement kind is always forced to
/// income, whatever state the record was in. Returns the movement id.
pub fn project(document: &mut Document, movements: &mut Vec<Movement>) -> Uuid {
    let index = match movements
        .iter()
        .position(|movement| movement.linked_document_id == Some(document.id))
    {
        Some(index) => index,
        None => {
            movements.push(Movement {
                id: Uuid::new_v4(),
                kind: MovementKind::Income,
                date: None,
                description: String::new(),
                category: String::new(),
                method: String::new(),
                amount: 0.0,
                created_at: document.created_at,
                linked_document_id: Some(document.id),
            });
            movements.len() - 1
        }
    };

    let movement = &mut movements[index];
    movement.kind = MovementKind::Income;
    movement.date = document.date;
    movement.description = format!("Invoice {} - {}", document.number, document.client.name);
    movement.category = PROJECTION_CATEGORY.to_string();
    movement.method = if document.method.trim().is_empty() {
        "Other".to_string()
    } else {
        document.method.clone()
    };
    movement.amount = document.total;

    let movement_id = movement.id;
    document.linked_movement_id = Some(movement_id);
    movement_id
}

/// Removes the movement linked to `document`, if any. A missing linked
/// movement is not an error.
pub fn unproject(document: &Document, movements: &mut Vec<Movement>) {
    movements.retain(|movement| movement.linked_document_id != Some(document.id));
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Client, DocumentKind, LineItem};

    fn invoice(total: f64) -> Document {
        Document {
            id: Uuid::new_v4(),
            kind: DocumentKind::Invoice,
            number: "F-001".to_string(),
            date: "2024-03-01".parse().ok(),
            due_date: None,
            client: Client {
                name: "Acme".to_string(),
                ..Client::default()
            },
            items: vec![LineItem {
                description: "Widget".to_string(),
                quantity: 1.0,
                unit_price: total,
                tax_percent: 0.0,
            }],
            tax_percent: None,
            subtotal: total,
            tax_amount: 0.0,
            total,
            notes: String::new(),
            method: String::new(),
            created_at: Utc::now(),
            linked_movement_id: None,
        }
    }

    #[test]
    fn project_creates_exactly_one_linked_movement() {
        let mut document = invoice(110.0);
        let mut movements = Vec::new();

        let first = project(&mut document, &mut movements);
        let second = project(&mut document, &mut movements);

        assert_eq!(first, second);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].amount, 110.0);
        assert_eq!(movements[0].kind, MovementKind::Income);
        assert_eq!(movements[0].category, PROJECTION_CATEGORY);
        assert_eq!(movements[0].method, "Other");
        assert_eq!(movements[0].linked_document_id, Some(document.id));
        assert_eq!(document.linked_movement_id, Some(movements[0].id));
    }

    #[test]
    fn project_recreates_after_independent_delete() {
        let mut document = invoice(50.0);
        let mut movements = Vec::new();

        let stale = project(&mut document, &mut movements);
        movements.clear();
        let fresh = project(&mut document, &mut movements);

        assert_ne!(stale, fresh);
        assert_eq!(movements.len(), 1);
        assert_eq!(document.linked_movement_id, Some(fresh));
    }

    #[test]
    fn unproject_removes_only_the_linked_movement() {
        let mut document = invoice(80.0);
        let mut other = invoice(20.0);
        let mut movements = Vec::new();
        project(&mut document, &mut movements);
        project(&mut other, &mut movements);

        unproject(&document, &mut movements);

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].linked_document_id, Some(other.id));
    }
}
