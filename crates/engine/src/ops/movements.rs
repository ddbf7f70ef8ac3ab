use uuid::Uuid;

use crate::{Ledger, LedgerError, Movement, MovementDraft, MovementKind, ResultEngine};

impl Ledger {
    /// Records an income movement from user input.
    pub fn income(&mut self, draft: MovementDraft) -> ResultEngine<Uuid> {
        self.add_movement(MovementKind::Income, draft)
    }

    /// Records an expense movement from user input.
    pub fn expense(&mut self, draft: MovementDraft) -> ResultEngine<Uuid> {
        self.add_movement(MovementKind::Expense, draft)
    }

    fn add_movement(&mut self, kind: MovementKind, draft: MovementDraft) -> ResultEngine<Uuid> {
        draft.validate()?;
        let movement = Movement::from_draft(kind, draft);
        let movement_id = movement.id;
        self.store.movements.push(movement);
        self.store.save_movements()?;
        Ok(movement_id)
    }

    /// Deletes a movement by id. Projected movements can be deleted too; the
    /// next save of their invoice recreates them.
    pub fn delete_movement(&mut self, movement_id: Uuid) -> ResultEngine<()> {
        let index = self
            .store
            .movements
            .iter()
            .position(|movement| movement.id == movement_id)
            .ok_or_else(|| LedgerError::KeyNotFound(movement_id.to_string()))?;
        self.store.movements.remove(index);
        self.store.save_movements()
    }

    /// All movements of one kind, in insertion order.
    pub fn movements_of_kind(&self, kind: MovementKind) -> Vec<&Movement> {
        self.store
            .movements
            .iter()
            .filter(|movement| movement.kind == kind)
            .collect()
    }

    /// The newest movements of one kind, most recent first. Ties keep
    /// insertion order.
    pub fn recent_movements(&self, kind: MovementKind, limit: usize) -> Vec<&Movement> {
        let mut movements = self.movements_of_kind(kind);
        movements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        movements.truncate(limit);
        movements
    }
}
