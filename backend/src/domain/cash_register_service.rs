//! # Cash register ledger
//!
//! Opens, feeds and closes till sessions (caixa). At most one register is
//! open per operational context, movements can only be appended while it is
//! open, and every balance is recomputed from the movement list on read.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::config::CashRegisterConfig;
use crate::domain::commands::cash_register::{
    CashRegisterReport, CloseCashRegisterCommand, CloseOutcome, OpenCashRegisterCommand,
    RecordMovementCommand,
};
use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::cash_register::{
    CashRegister, ClosingPolicy, Movement, NewCashRegister, NewMovement, RegisterClosing,
};
use crate::storage::CashRegisterStorage;

#[derive(Clone)]
pub struct CashRegisterService {
    storage: Arc<dyn CashRegisterStorage>,
    config: CashRegisterConfig,
}

impl CashRegisterService {
    pub fn new(storage: Arc<dyn CashRegisterStorage>, config: CashRegisterConfig) -> Self {
        Self { storage, config }
    }

    pub fn closing_policy(&self) -> ClosingPolicy {
        self.config.closing_policy
    }

    /// Open a register in `command.context`.
    ///
    /// Fails with `Conflict` if one is already open there; the open register
    /// is left untouched. Numbers continue from the highest one issued for
    /// the context.
    pub async fn open(&self, command: OpenCashRegisterCommand) -> DomainResult<CashRegister> {
        let context = command.context.trim().to_string();
        info!("💰 Opening cash register in {} with {}", context, command.opening_balance);

        let mut errors = ValidationErrors::new();
        if context.is_empty() {
            errors.push("context", FieldErrorKind::Required);
        }
        if command.opening_balance < Decimal::ZERO {
            errors.push("opening_balance", FieldErrorKind::Negative);
        }
        errors.into_result()?;

        if let Some(open) = self.storage.get_open_register(&context).await? {
            warn!("Cash register #{} is already open in {}", open.number, context);
            return Err(DomainError::Conflict(format!(
                "cash register #{} is already open in {}",
                open.number, context
            )));
        }

        let number = self.storage.last_register_number(&context).await?.unwrap_or(0) + 1;
        let register = self
            .storage
            .open_register(&NewCashRegister {
                context,
                number,
                opening_balance: command.opening_balance,
                notes: command.notes.filter(|n| !n.trim().is_empty()),
                opened_at: Utc::now(),
            })
            .await?;

        info!("💰 Opened cash register #{} ({})", register.number, register.id);
        Ok(register)
    }

    /// Append a movement to an open register. Rejected movements leave the
    /// register unchanged.
    pub async fn record_movement(&self, command: RecordMovementCommand) -> DomainResult<Movement> {
        debug!(
            "Recording {:?} of {} on {}",
            command.kind, command.amount, command.register_id
        );

        let register = self.get(&command.register_id).await?;
        if !register.is_open() {
            return Err(DomainError::InvalidState(format!(
                "cash register #{} is closed",
                register.number
            )));
        }

        let mut errors = ValidationErrors::new();
        if command.amount <= Decimal::ZERO {
            errors.push("amount", FieldErrorKind::NotPositive);
        }
        if command.description.trim().is_empty() {
            errors.push("description", FieldErrorKind::Required);
        }
        let representable = register.checked_balance_with(command.kind, command.amount).is_some();
        if command.amount > Decimal::ZERO && !representable {
            errors.push("amount", amount_out_of_range());
        }
        errors.into_result()?;

        let movement = self
            .storage
            .append_movement(
                &register.id,
                &NewMovement {
                    kind: command.kind,
                    amount: command.amount,
                    description: command.description.trim().to_string(),
                    payment_method: command.payment_method,
                    timestamp: Utc::now(),
                },
            )
            .await?;

        info!(
            "💰 {:?} of {} recorded on register #{} ({})",
            movement.kind,
            movement.amount,
            register.number,
            movement.payment_method.as_wire()
        );
        Ok(movement)
    }

    /// Close an open register with the counted balance.
    ///
    /// Reports both the computed and the counted balance. Under
    /// `ClosingPolicy::RequireMatch` a difference is a validation error.
    pub async fn close(&self, command: CloseCashRegisterCommand) -> DomainResult<CloseOutcome> {
        let register = self.get(&command.register_id).await?;
        if !register.is_open() {
            return Err(DomainError::InvalidState(format!(
                "cash register #{} is already closed",
                register.number
            )));
        }
        if command.closing_balance < Decimal::ZERO {
            return Err(DomainError::validation("closing_balance", FieldErrorKind::Negative));
        }

        let computed_balance = register.running_balance();
        let discrepancy = command
            .closing_balance
            .checked_sub(computed_balance)
            .ok_or_else(|| DomainError::validation("closing_balance", amount_out_of_range()))?;
        if discrepancy != Decimal::ZERO && self.config.closing_policy == ClosingPolicy::RequireMatch {
            return Err(DomainError::validation(
                "closing_balance",
                FieldErrorKind::BalanceMismatch {
                    computed: computed_balance,
                    entered: command.closing_balance,
                },
            ));
        }

        let closed = self
            .storage
            .close_register(
                &register.id,
                &RegisterClosing {
                    closing_balance: command.closing_balance,
                    notes: command.notes,
                    closed_at: Utc::now(),
                },
            )
            .await?;

        if discrepancy != Decimal::ZERO {
            warn!(
                "Cash register #{} closed with a difference of {} (computed {}, counted {})",
                closed.number, discrepancy, computed_balance, command.closing_balance
            );
        }
        info!("💰 Closed cash register #{} with {}", closed.number, command.closing_balance);

        Ok(CloseOutcome {
            register: closed,
            computed_balance,
            entered_balance: command.closing_balance,
            discrepancy,
        })
    }

    pub async fn get_open(&self, context: &str) -> DomainResult<Option<CashRegister>> {
        Ok(self.storage.get_open_register(context.trim()).await?)
    }

    /// Registers of `context`, most recent first. The limit is capped by
    /// the configured history size.
    pub async fn list_history(&self, context: &str, limit: Option<usize>) -> DomainResult<Vec<CashRegister>> {
        let limit = limit
            .unwrap_or(self.config.history_limit)
            .min(self.config.history_limit);
        let history = self.storage.list_registers(context.trim(), limit).await?;
        debug!("Loaded {} registers of {}", history.len(), context);
        Ok(history)
    }

    pub async fn get(&self, register_id: &str) -> DomainResult<CashRegister> {
        self.storage
            .get_register(register_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("cash register {} not found", register_id)))
    }

    /// Totals of a register, open or closed
    pub async fn report(&self, register_id: &str) -> DomainResult<CashRegisterReport> {
        let register = self.get(register_id).await?;
        Ok(Self::build_report(register))
    }

    /// Last `n` movements, newest first
    pub fn recent_movements(register: &CashRegister, n: usize) -> Vec<Movement> {
        register.recent_movements(n).into_iter().cloned().collect()
    }

    /// Movements for the "latest movements" panel, sized by configuration
    pub fn recent_panel(&self, register: &CashRegister) -> Vec<Movement> {
        Self::recent_movements(register, self.config.recent_movements)
    }

    fn build_report(register: CashRegister) -> CashRegisterReport {
        let mut totals_by_payment_method = BTreeMap::new();
        let mut counts_by_kind = BTreeMap::new();
        for movement in &register.movements {
            let total = totals_by_payment_method
                .entry(movement.payment_method.clone())
                .or_insert(Decimal::ZERO);
            *total = total.saturating_add(movement.signed_amount());
            *counts_by_kind.entry(movement.kind).or_insert(0) += 1;
        }

        CashRegisterReport {
            register_id: register.id.clone(),
            number: register.number,
            status: register.status,
            opening_balance: register.opening_balance,
            total_entries: register.total_entries(),
            total_exits: register.total_exits(),
            running_balance: register.running_balance(),
            closing_balance: register.closing_balance,
            discrepancy: register.discrepancy(),
            totals_by_payment_method,
            counts_by_kind,
            movements: register.movements,
        }
    }
}

/// A movement or counted balance the ledger cannot represent
fn amount_out_of_range() -> FieldErrorKind {
    FieldErrorKind::OutOfRange {
        min: "0.01".to_string(),
        max: Decimal::MAX.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::cash_register::{CashRegisterStatus, MovementKind, PaymentMethod};
    use crate::storage::memory::test_utils::dec;
    use crate::storage::memory::{MemoryCashRegisterRepository, MemoryConnection};

    fn create_test_service(policy: ClosingPolicy) -> CashRegisterService {
        let storage = Arc::new(MemoryCashRegisterRepository::new(Arc::new(MemoryConnection::new())));
        CashRegisterService::new(
            storage,
            CashRegisterConfig {
                closing_policy: policy,
                ..Default::default()
            },
        )
    }

    async fn open(service: &CashRegisterService, balance: &str) -> CashRegister {
        service
            .open(OpenCashRegisterCommand {
                context: "principal".to_string(),
                opening_balance: dec(balance),
                notes: None,
            })
            .await
            .unwrap()
    }

    fn movement(register: &CashRegister, kind: MovementKind, amount: &str) -> RecordMovementCommand {
        RecordMovementCommand {
            register_id: register.id.clone(),
            kind,
            amount: dec(amount),
            description: format!("{:?}", kind),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_open_rejects_negative_balance() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let err = service
            .open(OpenCashRegisterCommand {
                context: "principal".to_string(),
                opening_balance: dec("-0.01"),
                notes: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().kind_of("opening_balance"),
            Some(&FieldErrorKind::Negative)
        );
    }

    #[tokio::test]
    async fn test_numbers_continue_per_context() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let first = open(&service, "0").await;
        assert_eq!(first.number, 1);
        service
            .close(CloseCashRegisterCommand {
                register_id: first.id.clone(),
                closing_balance: dec("0"),
                notes: String::new(),
            })
            .await
            .unwrap();

        let second = open(&service, "0").await;
        assert_eq!(second.number, 2);
    }

    #[tokio::test]
    async fn test_second_open_conflicts_and_keeps_first() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let first = open(&service, "100").await;
        service
            .record_movement(movement(&first, MovementKind::Entry, "10"))
            .await
            .unwrap();

        let err = service
            .open(OpenCashRegisterCommand {
                context: "principal".to_string(),
                opening_balance: dec("50"),
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let still_open = service.get_open("principal").await.unwrap().unwrap();
        assert_eq!(still_open.id, first.id);
        assert_eq!(still_open.opening_balance, dec("100"));
        assert_eq!(still_open.movements.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_movements_leave_register_untouched() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "100").await;

        for amount in ["0", "-5"] {
            let err = service
                .record_movement(movement(&register, MovementKind::Entry, amount))
                .await
                .unwrap_err();
            assert!(err.validation_errors().unwrap().has("amount"));
        }

        let mut blank = movement(&register, MovementKind::Exit, "5");
        blank.description = "   ".to_string();
        assert!(service.record_movement(blank).await.is_err());

        let reloaded = service.get(&register.id).await.unwrap();
        assert!(reloaded.movements.is_empty());
        assert_eq!(reloaded.running_balance(), dec("100"));
    }

    #[tokio::test]
    async fn test_movement_past_decimal_range_is_rejected() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "0").await;
        let mut first = movement(&register, MovementKind::Entry, "1");
        first.amount = Decimal::MAX;
        service.record_movement(first.clone()).await.unwrap();

        let err = service.record_movement(first).await.unwrap_err();
        assert!(matches!(
            err.validation_errors().unwrap().kind_of("amount"),
            Some(FieldErrorKind::OutOfRange { .. })
        ));

        let reloaded = service.get(&register.id).await.unwrap();
        assert_eq!(reloaded.movements.len(), 1);
        assert_eq!(reloaded.running_balance(), Decimal::MAX);

        // Exits still fit and the register still closes and reports
        service
            .record_movement(movement(&register, MovementKind::Withdrawal, "10"))
            .await
            .unwrap();
        let report = service.report(&register.id).await.unwrap();
        assert_eq!(report.running_balance, Decimal::MAX - dec("10"));
        let outcome = service
            .close(CloseCashRegisterCommand {
                register_id: register.id.clone(),
                closing_balance: Decimal::MAX - dec("10"),
                notes: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.discrepancy, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_register_is_not_found() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "0").await;
        let mut command = movement(&register, MovementKind::Entry, "1");
        command.register_id = "caixa::missing".to_string();
        assert!(matches!(
            service.record_movement(command).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_close_reports_discrepancy() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "100").await;
        service.record_movement(movement(&register, MovementKind::Entry, "50")).await.unwrap();
        service.record_movement(movement(&register, MovementKind::Withdrawal, "30")).await.unwrap();

        let outcome = service
            .close(CloseCashRegisterCommand {
                register_id: register.id.clone(),
                closing_balance: dec("115"),
                notes: "faltaram 5".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.computed_balance, dec("120"));
        assert_eq!(outcome.entered_balance, dec("115"));
        assert_eq!(outcome.discrepancy, dec("-5"));
        assert_eq!(outcome.register.status, CashRegisterStatus::Closed);
        assert_eq!(outcome.register.closing_balance, Some(dec("115")));
        assert!(outcome.register.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_require_match_policy_rejects_difference() {
        let service = create_test_service(ClosingPolicy::RequireMatch);
        let register = open(&service, "100").await;

        let err = service
            .close(CloseCashRegisterCommand {
                register_id: register.id.clone(),
                closing_balance: dec("99"),
                notes: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.validation_errors().unwrap().kind_of("closing_balance"),
            Some(FieldErrorKind::BalanceMismatch { .. })
        ));
        assert!(service.get(&register.id).await.unwrap().is_open());

        service
            .close(CloseCashRegisterCommand {
                register_id: register.id.clone(),
                closing_balance: dec("100.00"),
                notes: String::new(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_register_cannot_be_closed_again() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "10").await;
        let close = CloseCashRegisterCommand {
            register_id: register.id.clone(),
            closing_balance: dec("10"),
            notes: String::new(),
        };
        service.close(close.clone()).await.unwrap();
        assert!(matches!(service.close(close).await, Err(DomainError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_history_limit_is_capped() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        for _ in 0..12 {
            let register = open(&service, "0").await;
            service
                .close(CloseCashRegisterCommand {
                    register_id: register.id,
                    closing_balance: dec("0"),
                    notes: String::new(),
                })
                .await
                .unwrap();
        }

        assert_eq!(service.list_history("principal", Some(100)).await.unwrap().len(), 10);
        let three = service.list_history("principal", Some(3)).await.unwrap();
        assert_eq!(three.len(), 3);
        assert_eq!(three[0].number, 12);
    }

    #[tokio::test]
    async fn test_report_groups_movements() {
        let service = create_test_service(ClosingPolicy::AllowDiscrepancy);
        let register = open(&service, "100").await;
        service.record_movement(movement(&register, MovementKind::Entry, "80")).await.unwrap();
        let mut pix = movement(&register, MovementKind::Entry, "40");
        pix.payment_method = PaymentMethod::Pix;
        service.record_movement(pix).await.unwrap();
        service.record_movement(movement(&register, MovementKind::Supply, "20")).await.unwrap();
        service.record_movement(movement(&register, MovementKind::Withdrawal, "50")).await.unwrap();

        let report = service.report(&register.id).await.unwrap();
        assert_eq!(report.total_entries, dec("140"));
        assert_eq!(report.total_exits, dec("50"));
        assert_eq!(report.running_balance, dec("190"));
        assert_eq!(report.totals_by_payment_method[&PaymentMethod::Cash], dec("50"));
        assert_eq!(report.totals_by_payment_method[&PaymentMethod::Pix], dec("40"));
        assert_eq!(report.counts_by_kind[&MovementKind::Entry], 2);
        assert_eq!(report.discrepancy, None);
        assert_eq!(report.movements.len(), 4);

        let recent = service.recent_panel(&service.get(&register.id).await.unwrap());
        assert_eq!(recent[0].kind, MovementKind::Withdrawal);
    }
}
