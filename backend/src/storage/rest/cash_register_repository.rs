use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use shared::{CashRegisterDto, MovementDto};

use super::found;
use crate::domain::mappers::CashRegisterMapper;
use crate::domain::models::cash_register::{CashRegister, Movement, NewCashRegister, NewMovement, RegisterClosing};
use crate::io::ApiClient;
use crate::storage::CashRegisterStorage;

const COLLECTION: &str = "caixas";

#[derive(Clone)]
pub struct RestCashRegisterRepository {
    client: Arc<ApiClient>,
}

impl RestCashRegisterRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn history(&self, context: &str, limit: Option<usize>) -> Result<Vec<CashRegister>> {
        let query = history_query(context, limit);
        let page = self.client.get_list::<CashRegisterDto>("/caixa", &query, COLLECTION).await?;
        let registers = page
            .items
            .into_iter()
            .map(CashRegisterMapper::from_dto)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(registers)
    }
}

/// No limit asks for the whole history of the context
fn history_query(context: &str, limit: Option<usize>) -> Vec<(&'static str, String)> {
    let mut query = vec![("local", context.to_string())];
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

/// Highest number issued, whatever order the backend listed them in
fn highest_number(registers: &[CashRegister]) -> Option<u32> {
    registers.iter().map(|r| r.number).max()
}

#[async_trait]
impl CashRegisterStorage for RestCashRegisterRepository {
    async fn get_open_register(&self, context: &str) -> Result<Option<CashRegister>> {
        let query = [("local", context.to_string())];
        let dto = found(self.client.get_json::<Option<CashRegisterDto>>("/caixa/aberto", &query).await)?.flatten();
        Ok(dto.map(CashRegisterMapper::from_dto).transpose()?)
    }

    async fn last_register_number(&self, context: &str) -> Result<Option<u32>> {
        let registers = self.history(context, None).await?;
        Ok(highest_number(&registers))
    }

    async fn open_register(&self, register: &NewCashRegister) -> Result<CashRegister> {
        let request = CashRegisterMapper::open_request(register);
        let dto: CashRegisterDto = self.client.post_json("/caixa/abrir", &request).await?;
        debug!("Backend opened register {} #{}", dto.id, dto.number);
        Ok(CashRegisterMapper::from_dto(dto)?)
    }

    async fn get_register(&self, register_id: &str) -> Result<Option<CashRegister>> {
        let path = format!("/caixa/{}", register_id);
        let dto = found(self.client.get_json::<CashRegisterDto>(&path, &[]).await)?;
        Ok(dto.map(CashRegisterMapper::from_dto).transpose()?)
    }

    async fn append_movement(&self, register_id: &str, movement: &NewMovement) -> Result<Movement> {
        let path = format!("/caixa/{}/movimentos", register_id);
        let request = CashRegisterMapper::movement_request(movement);
        let dto: MovementDto = self.client.post_json(&path, &request).await?;
        Ok(CashRegisterMapper::movement_from_dto(dto)?)
    }

    async fn close_register(&self, register_id: &str, closing: &RegisterClosing) -> Result<CashRegister> {
        let path = format!("/caixa/{}/fechar", register_id);
        let request = CashRegisterMapper::close_request(closing);
        let dto: CashRegisterDto = self.client.post_json(&path, &request).await?;
        Ok(CashRegisterMapper::from_dto(dto)?)
    }

    async fn list_registers(&self, context: &str, limit: usize) -> Result<Vec<CashRegister>> {
        let mut registers = self.history(context, Some(limit)).await?;
        registers.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        registers.truncate(limit);
        Ok(registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::models::cash_register::CashRegisterStatus;

    fn register(number: u32, day: u32) -> CashRegister {
        CashRegister {
            id: format!("caixa::{}", number),
            number,
            context: "principal".to_string(),
            opened_at: Utc.with_ymd_and_hms(2026, 10, day, 8, 0, 0).unwrap(),
            closed_at: None,
            opening_balance: Decimal::ZERO,
            closing_balance: None,
            status: CashRegisterStatus::Closed,
            movements: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn test_numbering_scan_requests_whole_history() {
        let query = history_query("principal", None);
        assert_eq!(query, vec![("local", "principal".to_string())]);

        let limited = history_query("principal", Some(20));
        assert!(limited.contains(&("limit", "20".to_string())));
    }

    #[test]
    fn test_highest_number_ignores_listing_order() {
        // Oldest first, the way some backends list
        let registers = vec![register(1, 1), register(7, 3), register(4, 2)];
        assert_eq!(highest_number(&registers), Some(7));
        assert_eq!(highest_number(&[]), None);
    }
}
