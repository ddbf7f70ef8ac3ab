use chrono::Utc;
use uuid::Uuid;

use crate::render::DocumentRender;
use crate::{
    Client, Document, DocumentDraft, DocumentKind, Ledger, LedgerError, ResultEngine,
    ValidationError, projection,
};

impl Ledger {
    /// Creates or updates a document from user input.
    ///
    /// Validation runs first and nothing is applied on failure. On success
    /// the totals are recomputed, an invoice is re-projected into the
    /// movement ledger, and both collections are persisted (documents first,
    /// then movements).
    pub fn save_document(&mut self, mut draft: DocumentDraft) -> ResultEngine<Uuid> {
        draft.normalize();
        draft.validate()?;
        if self.rules.unique_document_numbers {
            self.check_unique_number(&draft)?;
        }

        let index = match draft.id.and_then(|id| self.position(id)) {
            Some(index) => {
                apply_draft(&mut self.store.documents[index], draft);
                index
            }
            None => {
                self.store.documents.push(new_document(draft));
                self.store.documents.len() - 1
            }
        };

        let store = &mut self.store;
        let document = &mut store.documents[index];
        document.recalc_totals();
        if document.kind == DocumentKind::Invoice {
            projection::project(document, &mut store.movements);
        }
        let document_id = document.id;

        store.save_documents()?;
        store.save_movements()?;
        Ok(document_id)
    }

    /// Deletes a document. For invoices this cascades to the linked
    /// movement; every other movement is untouched.
    pub fn delete_document(&mut self, document_id: Uuid) -> ResultEngine<()> {
        let index = self
            .position(document_id)
            .ok_or_else(|| LedgerError::KeyNotFound(document_id.to_string()))?;
        let document = self.store.documents.remove(index);
        projection::unproject(&document, &mut self.store.movements);
        self.store.save_documents()?;
        self.store.save_movements()
    }

    /// Turns a quote into an invoice, projecting it into the movement ledger
    /// exactly once at conversion time.
    pub fn convert_quote_to_invoice(&mut self, document_id: Uuid) -> ResultEngine<Uuid> {
        let index = self
            .position(document_id)
            .ok_or_else(|| LedgerError::KeyNotFound(document_id.to_string()))?;
        let store = &mut self.store;
        let document = &mut store.documents[index];
        if document.kind == DocumentKind::Invoice {
            return Err(ValidationError::new("kind", "document is already an invoice").into());
        }
        document.kind = DocumentKind::Invoice;
        let movement_id = projection::project(document, &mut store.movements);
        store.save_documents()?;
        store.save_movements()?;
        Ok(movement_id)
    }

    /// Looks up a document by id.
    pub fn document(&self, document_id: Uuid) -> ResultEngine<&Document> {
        self.store
            .documents
            .iter()
            .find(|document| document.id == document_id)
            .ok_or_else(|| LedgerError::KeyNotFound(document_id.to_string()))
    }

    /// Builds the render model consumed by the PDF collaborator.
    pub fn render_document(&self, document_id: Uuid) -> ResultEngine<DocumentRender> {
        let document = self.document(document_id)?;
        Ok(DocumentRender::build(document, self.store.config()))
    }

    fn position(&self, document_id: Uuid) -> Option<usize> {
        self.store
            .documents
            .iter()
            .position(|document| document.id == document_id)
    }

    fn check_unique_number(&self, draft: &DocumentDraft) -> ResultEngine<()> {
        let number = draft.number.trim();
        let clash = self.store.documents.iter().any(|document| {
            document.number == number && draft.id.map_or(true, |id| id != document.id)
        });
        if clash {
            return Err(ValidationError::new(
                "number",
                format!("document number \"{number}\" is already in use"),
            )
            .into());
        }
        Ok(())
    }
}

fn trimmed_client(client: Client) -> Client {
    Client {
        name: client.name.trim().to_string(),
        address: client.address.filter(|value| !value.trim().is_empty()),
        email: client.email.filter(|value| !value.trim().is_empty()),
        phone: client.phone.filter(|value| !value.trim().is_empty()),
    }
}

fn new_document(draft: DocumentDraft) -> Document {
    Document {
        id: draft.id.unwrap_or_else(Uuid::new_v4),
        kind: draft.kind,
        number: draft.number.trim().to_string(),
        date: draft.date,
        due_date: draft.due_date,
        client: trimmed_client(draft.client),
        items: draft.items,
        tax_percent: draft.tax_percent,
        subtotal: 0.0,
        tax_amount: 0.0,
        total: 0.0,
        notes: draft.notes,
        method: draft.method,
        created_at: Utc::now(),
        linked_movement_id: None,
    }
}

/// Applies an edit to an existing document. The id, kind, creation timestamp
/// and movement link are stable across edits; kind only changes through
/// [`Ledger::convert_quote_to_invoice`].
fn apply_draft(document: &mut Document, draft: DocumentDraft) {
    document.number = draft.number.trim().to_string();
    document.date = draft.date;
    document.due_date = draft.due_date;
    document.client = trimmed_client(draft.client);
    document.items = draft.items;
    document.tax_percent = draft.tax_percent;
    document.notes = draft.notes;
    document.method = draft.method;
}
