//! Domain-level command, query and result types.
//! Services take these instead of the wire DTOs in `shared`; the storage
//! layer is responsible for mapping between the two.

pub mod cash_register {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use crate::domain::models::cash_register::{
        CashRegister, CashRegisterStatus, Movement, MovementKind, PaymentMethod,
    };

    /// Input for opening a register in an operational context.
    #[derive(Debug, Clone)]
    pub struct OpenCashRegisterCommand {
        pub context: String,
        pub opening_balance: Decimal,
        pub notes: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct RecordMovementCommand {
        pub register_id: String,
        pub kind: MovementKind,
        pub amount: Decimal,
        pub description: String,
        pub payment_method: PaymentMethod,
    }

    #[derive(Debug, Clone)]
    pub struct CloseCashRegisterCommand {
        pub register_id: String,
        /// Cash counted by the operator
        pub closing_balance: Decimal,
        pub notes: String,
    }

    /// Result of closing a register. Both balances are reported so the UI can
    /// show the difference between counted and computed cash.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CloseOutcome {
        pub register: CashRegister,
        pub computed_balance: Decimal,
        pub entered_balance: Decimal,
        /// entered - computed
        pub discrepancy: Decimal,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CashRegisterReport {
        pub register_id: String,
        pub number: u32,
        pub status: CashRegisterStatus,
        pub opening_balance: Decimal,
        pub total_entries: Decimal,
        pub total_exits: Decimal,
        pub running_balance: Decimal,
        pub closing_balance: Option<Decimal>,
        pub discrepancy: Option<Decimal>,
        /// Signed totals: entries add, exits subtract
        pub totals_by_payment_method: BTreeMap<PaymentMethod, Decimal>,
        pub counts_by_kind: BTreeMap<MovementKind, usize>,
        pub movements: Vec<Movement>,
    }
}

pub mod student {
    /// Query parameters for listing students.
    #[derive(Debug, Clone, Default)]
    pub struct StudentListQuery {
        pub search: Option<String>,
        pub page: Option<u32>,
        pub limit: Option<u32>,
    }
}

pub mod enrollment {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[derive(Debug, Clone)]
    pub struct CreateEnrollmentCommand {
        pub student_id: String,
        pub plan_id: String,
        pub start_date: NaiveDate,
        pub due_day: u8,
        pub final_value: Decimal,
    }

    #[derive(Debug, Clone, Default)]
    pub struct EnrollmentListQuery {
        pub student_id: Option<String>,
        /// Matches student name, student document or plan name
        pub search: Option<String>,
    }
}

pub mod user {
    use crate::domain::models::user::Role;
    use crate::domain::models::RecordStatus;

    #[derive(Debug, Clone, Default)]
    pub struct UserFilter {
        pub search: Option<String>,
        pub role: Option<Role>,
        pub status: Option<RecordStatus>,
    }
}
