use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use super::connection::MemoryConnection;
use crate::domain::models::cash_register::{
    CashRegister, CashRegisterStatus, Movement, NewCashRegister, NewMovement, RegisterClosing,
};
use crate::domain::models::generate_id;
use crate::storage::{CashRegisterStorage, StorageError};

#[derive(Clone)]
pub struct MemoryCashRegisterRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryCashRegisterRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

fn open_register_mut<'a>(registers: &'a mut [CashRegister], register_id: &str) -> Result<&'a mut CashRegister> {
    let register = registers
        .iter_mut()
        .find(|r| r.id == register_id)
        .ok_or_else(|| StorageError::NotFound(format!("cash register {} not found", register_id)))?;
    if !register.is_open() {
        return Err(StorageError::InvalidState(format!("cash register {} is closed", register_id)).into());
    }
    Ok(register)
}

#[async_trait]
impl CashRegisterStorage for MemoryCashRegisterRepository {
    async fn get_open_register(&self, context: &str) -> Result<Option<CashRegister>> {
        let tables = self.conn.read().await;
        Ok(tables
            .registers
            .iter()
            .find(|r| r.context == context && r.is_open())
            .cloned())
    }

    async fn last_register_number(&self, context: &str) -> Result<Option<u32>> {
        let tables = self.conn.read().await;
        Ok(tables
            .registers
            .iter()
            .filter(|r| r.context == context)
            .map(|r| r.number)
            .max())
    }

    async fn open_register(&self, register: &NewCashRegister) -> Result<CashRegister> {
        let mut tables = self.conn.write().await;

        // Re-checked under the write lock; the service check alone can race.
        if let Some(open) = tables
            .registers
            .iter()
            .find(|r| r.context == register.context && r.is_open())
        {
            return Err(StorageError::Conflict(format!(
                "cash register #{} is already open in {}",
                open.number, register.context
            ))
            .into());
        }

        let created = CashRegister {
            id: generate_id("caixa"),
            number: register.number,
            context: register.context.clone(),
            opened_at: register.opened_at,
            closed_at: None,
            opening_balance: register.opening_balance,
            closing_balance: None,
            status: CashRegisterStatus::Open,
            movements: Vec::new(),
            notes: register.notes.clone(),
        };
        tables.registers.push(created.clone());
        debug!("Stored cash register {} in memory", created.id);
        Ok(created)
    }

    async fn get_register(&self, register_id: &str) -> Result<Option<CashRegister>> {
        let tables = self.conn.read().await;
        Ok(tables.registers.iter().find(|r| r.id == register_id).cloned())
    }

    async fn append_movement(&self, register_id: &str, movement: &NewMovement) -> Result<Movement> {
        let mut tables = self.conn.write().await;
        let register = open_register_mut(&mut tables.registers, register_id)?;

        let stored = Movement {
            id: generate_id("movimento"),
            kind: movement.kind,
            amount: movement.amount,
            description: movement.description.clone(),
            payment_method: movement.payment_method.clone(),
            timestamp: movement.timestamp,
        };
        register.movements.push(stored.clone());
        Ok(stored)
    }

    async fn close_register(&self, register_id: &str, closing: &RegisterClosing) -> Result<CashRegister> {
        let mut tables = self.conn.write().await;
        let register = open_register_mut(&mut tables.registers, register_id)?;

        register.status = CashRegisterStatus::Closed;
        register.closed_at = Some(closing.closed_at);
        register.closing_balance = Some(closing.closing_balance);
        if !closing.notes.trim().is_empty() {
            register.notes = Some(closing.notes.trim().to_string());
        }
        Ok(register.clone())
    }

    async fn list_registers(&self, context: &str, limit: usize) -> Result<Vec<CashRegister>> {
        let tables = self.conn.read().await;
        let mut registers: Vec<CashRegister> = tables
            .registers
            .iter()
            .filter(|r| r.context == context)
            .cloned()
            .collect();
        registers.sort_by(|a, b| {
            b.opened_at
                .cmp(&a.opened_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        registers.truncate(limit);
        Ok(registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::cash_register::{MovementKind, PaymentMethod};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn new_register(context: &str, number: u32) -> NewCashRegister {
        NewCashRegister {
            context: context.to_string(),
            number,
            opening_balance: Decimal::new(5000, 2),
            notes: None,
            opened_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_second_open_in_same_context_conflicts() {
        let repo = MemoryCashRegisterRepository::new(Arc::new(MemoryConnection::new()));
        repo.open_register(&new_register("principal", 1)).await.unwrap();

        let err = repo.open_register(&new_register("principal", 2)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StorageError>(), Some(StorageError::Conflict(_))));

        // Another context is independent
        repo.open_register(&new_register("filial", 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_register_rejects_movements() {
        let repo = MemoryCashRegisterRepository::new(Arc::new(MemoryConnection::new()));
        let register = repo.open_register(&new_register("principal", 1)).await.unwrap();
        repo.close_register(
            &register.id,
            &RegisterClosing {
                closing_balance: Decimal::new(5000, 2),
                notes: String::new(),
                closed_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let movement = NewMovement {
            kind: MovementKind::Entry,
            amount: Decimal::ONE,
            description: "late".to_string(),
            payment_method: PaymentMethod::Cash,
            timestamp: Utc::now(),
        };
        let err = repo.append_movement(&register.id, &movement).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StorageError>(), Some(StorageError::InvalidState(_))));

        let missing = repo.append_movement("caixa::nope", &movement).await.unwrap_err();
        assert!(matches!(missing.downcast_ref::<StorageError>(), Some(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_registers_most_recent_first() {
        let repo = MemoryCashRegisterRepository::new(Arc::new(MemoryConnection::new()));
        for number in 1..=3 {
            let register = repo.open_register(&new_register("principal", number)).await.unwrap();
            repo.close_register(
                &register.id,
                &RegisterClosing {
                    closing_balance: Decimal::ZERO,
                    notes: String::new(),
                    closed_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        }

        let history = repo.list_registers("principal", 2).await.unwrap();
        let numbers: Vec<u32> = history.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![3, 2]);
        assert_eq!(repo.last_register_number("principal").await.unwrap(), Some(3));
        assert_eq!(repo.last_register_number("filial").await.unwrap(), None);
    }
}
