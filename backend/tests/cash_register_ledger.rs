use academia_backend::domain::commands::cash_register::{
    CloseCashRegisterCommand, OpenCashRegisterCommand, RecordMovementCommand,
};
use academia_backend::domain::models::cash_register::{CashRegisterStatus, MovementKind, PaymentMethod};
use academia_backend::domain::DomainError;
use academia_backend::storage::memory::test_utils::dec;
use academia_backend::Backend;
use rust_decimal::Decimal;

fn open_command(balance: &str) -> OpenCashRegisterCommand {
    OpenCashRegisterCommand {
        context: "principal".to_string(),
        opening_balance: dec(balance),
        notes: None,
    }
}

fn movement(register_id: &str, kind: MovementKind, amount: &str) -> RecordMovementCommand {
    RecordMovementCommand {
        register_id: register_id.to_string(),
        kind,
        amount: dec(amount),
        description: format!("{:?} {}", kind, amount),
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
async fn running_balance_holds_after_every_movement() {
    let backend = Backend::in_memory();
    let register = backend.cash_register.open(open_command("100.00")).await.unwrap();

    let steps = [
        (MovementKind::Entry, "50.00"),
        (MovementKind::Exit, "20.00"),
        (MovementKind::Supply, "30.00"),
        (MovementKind::Withdrawal, "45.50"),
        (MovementKind::Entry, "0.01"),
    ];

    let mut entries = Decimal::ZERO;
    let mut exits = Decimal::ZERO;
    for (kind, amount) in steps {
        backend
            .cash_register
            .record_movement(movement(&register.id, kind, amount))
            .await
            .unwrap();
        match kind {
            MovementKind::Entry | MovementKind::Supply => entries += dec(amount),
            MovementKind::Exit | MovementKind::Withdrawal => exits += dec(amount),
        }

        let current = backend.cash_register.get(&register.id).await.unwrap();
        assert_eq!(current.total_entries(), entries);
        assert_eq!(current.total_exits(), exits);
        assert_eq!(current.running_balance(), dec("100.00") + entries - exits);
    }

    assert_eq!(
        backend.cash_register.get(&register.id).await.unwrap().running_balance(),
        dec("114.51")
    );
}

#[tokio::test]
async fn second_open_register_in_same_context_conflicts() {
    let backend = Backend::in_memory();
    let first = backend.cash_register.open(open_command("100")).await.unwrap();
    backend
        .cash_register
        .record_movement(movement(&first.id, MovementKind::Entry, "10"))
        .await
        .unwrap();
    let before = backend.cash_register.get(&first.id).await.unwrap();

    let err = backend.cash_register.open(open_command("999")).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let after = backend.cash_register.get(&first.id).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(
        backend.cash_register.get_open("principal").await.unwrap().unwrap().id,
        first.id
    );

    // Another context is independent
    let other = backend
        .cash_register
        .open(OpenCashRegisterCommand {
            context: "recepcao".to_string(),
            opening_balance: dec("0"),
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(other.number, 1);
}

#[tokio::test]
async fn rejected_movements_leave_the_register_untouched() {
    let backend = Backend::in_memory();
    let register = backend.cash_register.open(open_command("50")).await.unwrap();
    backend
        .cash_register
        .record_movement(movement(&register.id, MovementKind::Entry, "5"))
        .await
        .unwrap();

    for amount in ["0", "-10"] {
        let err = backend
            .cash_register
            .record_movement(movement(&register.id, MovementKind::Entry, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    let current = backend.cash_register.get(&register.id).await.unwrap();
    assert_eq!(current.movements.len(), 1);
    assert_eq!(current.running_balance(), dec("55"));
}

#[tokio::test]
async fn closing_freezes_the_register() {
    let backend = Backend::in_memory();
    let register = backend.cash_register.open(open_command("100")).await.unwrap();
    backend
        .cash_register
        .record_movement(movement(&register.id, MovementKind::Entry, "40"))
        .await
        .unwrap();

    let outcome = backend
        .cash_register
        .close(CloseCashRegisterCommand {
            register_id: register.id.clone(),
            closing_balance: dec("135"),
            notes: "Faltou troco".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(outcome.computed_balance, dec("140"));
    assert_eq!(outcome.entered_balance, dec("135"));
    assert_eq!(outcome.discrepancy, dec("-5"));

    let err = backend
        .cash_register
        .record_movement(movement(&register.id, MovementKind::Entry, "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let closed = backend.cash_register.get(&register.id).await.unwrap();
    assert_eq!(closed.status, CashRegisterStatus::Closed);
    assert_eq!(closed.movements.len(), 1);
    assert!(backend.cash_register.get_open("principal").await.unwrap().is_none());

    // The next register continues the numbering
    let next = backend.cash_register.open(open_command("135")).await.unwrap();
    assert_eq!(next.number, register.number + 1);

    let history = backend.cash_register.list_history("principal", None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, next.id);
}

#[tokio::test]
async fn report_summarises_a_closed_register() {
    let backend = Backend::in_memory();
    let register = backend.cash_register.open(open_command("10")).await.unwrap();
    let mut pix = movement(&register.id, MovementKind::Entry, "25");
    pix.payment_method = PaymentMethod::Pix;
    backend.cash_register.record_movement(pix).await.unwrap();
    backend
        .cash_register
        .record_movement(movement(&register.id, MovementKind::Withdrawal, "5"))
        .await
        .unwrap();
    backend
        .cash_register
        .close(CloseCashRegisterCommand {
            register_id: register.id.clone(),
            closing_balance: dec("30"),
            notes: String::new(),
        })
        .await
        .unwrap();

    let report = backend.cash_register.report(&register.id).await.unwrap();
    assert_eq!(report.running_balance, dec("30"));
    assert_eq!(report.discrepancy, Some(Decimal::ZERO));
    assert_eq!(report.totals_by_payment_method[&PaymentMethod::Pix], dec("25"));
    assert_eq!(report.totals_by_payment_method[&PaymentMethod::Cash], dec("-5"));
    assert_eq!(report.counts_by_kind[&MovementKind::Withdrawal], 1);
}

#[tokio::test]
async fn movement_that_overflows_the_totals_is_rejected() {
    let backend = Backend::in_memory();
    let register = backend.cash_register.open(open_command("0")).await.unwrap();
    let mut huge = movement(&register.id, MovementKind::Supply, "1");
    huge.amount = Decimal::MAX;
    backend.cash_register.record_movement(huge.clone()).await.unwrap();

    let err = backend.cash_register.record_movement(huge).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let current = backend.cash_register.get(&register.id).await.unwrap();
    assert_eq!(current.movements.len(), 1);
    assert_eq!(current.total_entries(), Decimal::MAX);
    let report = backend.cash_register.report(&register.id).await.unwrap();
    assert_eq!(report.running_balance, Decimal::MAX);
}
