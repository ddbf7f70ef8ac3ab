//! CSV export of the movement collection.
//!
//! The format is fixed: a Spanish header row, one row per movement, with the
//! two free-text columns (`descripcion`, `categoria`) always quoted and
//! embedded quotes doubled. Amounts are written with 2 decimals; a movement
//! without a date gets an empty `fecha` cell.

use crate::{Movement, MovementKind};

const HEADER: &str = "tipo,fecha,descripcion,categoria,metodo,monto";

/// Renders movements as CSV. Filter the slice first to export a single kind.
pub fn movements_to_csv(movements: &[Movement]) -> String {
    let mut out = String::from(HEADER);
    for movement in movements {
        out.push('\n');
        out.push_str(&row(movement));
    }
    out
}

fn row(movement: &Movement) -> String {
    let fecha = movement
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{:.2}",
        kind_tag(movement.kind),
        fecha,
        quoted(&movement.description),
        quoted(&movement.category),
        movement.method,
        movement.amount
    )
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn kind_tag(kind: MovementKind) -> &'static str {
    match kind {
        MovementKind::Income => "ingreso",
        MovementKind::Expense => "gasto",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn movement(description: &str, category: &str, amount: f64) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            kind: MovementKind::Income,
            date: "2024-03-01".parse().ok(),
            description: description.to_string(),
            category: category.to_string(),
            method: "Cash".to_string(),
            amount,
            created_at: Utc::now(),
            linked_document_id: None,
        }
    }

    #[test]
    fn header_and_row_layout() {
        let csv = movements_to_csv(&[movement("Sale", "Sales", 100.0)]);
        assert_eq!(
            csv,
            "tipo,fecha,descripcion,categoria,metodo,monto\n\
             ingreso,2024-03-01,\"Sale\",\"Sales\",Cash,100.00"
        );
    }

    #[test]
    fn round_trips_through_a_conforming_parser() {
        let description = "Venta \"mayorista\", al contado";
        let csv = movements_to_csv(&[movement(description, "Ventas, B2B", 1234.5)]);

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[2], "descripcion");

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "ingreso");
        assert_eq!(&record[2], description);
        assert_eq!(&record[3], "Ventas, B2B");
        assert_eq!(&record[5], "1234.50");
    }

    #[test]
    fn missing_date_exports_empty_cell() {
        let mut undated = movement("x", "y", 5.0);
        undated.date = None;
        undated.kind = MovementKind::Expense;
        let csv = movements_to_csv(&[undated]);
        assert!(csv.ends_with("gasto,,\"x\",\"y\",Cash,5.00"));
    }
}
