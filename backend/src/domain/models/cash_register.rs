use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashRegisterStatus {
    Open,
    Closed,
}

impl CashRegisterStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            CashRegisterStatus::Open => "ABERTO",
            CashRegisterStatus::Closed => "FECHADO",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ABERTO" => Some(CashRegisterStatus::Open),
            "FECHADO" => Some(CashRegisterStatus::Closed),
            _ => None,
        }
    }
}

/// Effect of a movement on the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    Entry,
    Exit,
}

impl MovementType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            MovementType::Entry => "ENTRADA",
            MovementType::Exit => "SAIDA",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ENTRADA" => Some(MovementType::Entry),
            "SAIDA" => Some(MovementType::Exit),
            _ => None,
        }
    }
}

/// What the operator recorded. Supply (suprimento) and withdrawal (sangria)
/// are till adjustments that are not tied to a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovementKind {
    Entry,
    Exit,
    Supply,
    Withdrawal,
}

impl MovementKind {
    pub fn direction(&self) -> MovementType {
        match self {
            MovementKind::Entry | MovementKind::Supply => MovementType::Entry,
            MovementKind::Exit | MovementKind::Withdrawal => MovementType::Exit,
        }
    }

    pub fn category_wire(&self) -> &'static str {
        match self {
            MovementKind::Entry | MovementKind::Exit => "REGULAR",
            MovementKind::Supply => "SUPRIMENTO",
            MovementKind::Withdrawal => "SANGRIA",
        }
    }

    /// Rebuild the kind from the wire pair. A missing category means a
    /// regular movement.
    pub fn from_wire(movement_type: &str, category: Option<&str>) -> Option<Self> {
        let direction = MovementType::from_wire(movement_type)?;
        let category = category.map(|c| c.trim().to_uppercase());
        let kind = match (direction, category.as_deref()) {
            (MovementType::Entry, Some("SUPRIMENTO")) => MovementKind::Supply,
            (MovementType::Exit, Some("SANGRIA")) => MovementKind::Withdrawal,
            (MovementType::Entry, _) => MovementKind::Entry,
            (MovementType::Exit, _) => MovementKind::Exit,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    Pix,
    BankTransfer,
    Other(String),
}

impl PaymentMethod {
    pub fn as_wire(&self) -> &str {
        match self {
            PaymentMethod::Cash => "DINHEIRO",
            PaymentMethod::DebitCard => "CARTAO_DEBITO",
            PaymentMethod::CreditCard => "CARTAO_CREDITO",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "TRANSFERENCIA",
            PaymentMethod::Other(name) => name,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "DINHEIRO" => PaymentMethod::Cash,
            "CARTAO_DEBITO" => PaymentMethod::DebitCard,
            "CARTAO_CREDITO" => PaymentMethod::CreditCard,
            "PIX" => PaymentMethod::Pix,
            "TRANSFERENCIA" => PaymentMethod::BankTransfer,
            _ => PaymentMethod::Other(value.trim().to_string()),
        }
    }
}

/// How `close` treats a counted balance that differs from the computed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingPolicy {
    /// Record the counted cash and report the difference
    #[default]
    AllowDiscrepancy,
    /// Refuse to close unless the counted cash matches
    RequireMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub kind: MovementKind,
    pub amount: Decimal,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn movement_type(&self) -> MovementType {
        self.kind.direction()
    }

    /// Amount with the sign of its effect on the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.movement_type() {
            MovementType::Entry => self.amount,
            MovementType::Exit => -self.amount,
        }
    }
}

/// A till session bounded by an open and a close event.
///
/// Balances are always derived from `movements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: String,
    pub number: u32,
    pub context: String,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub opening_balance: Decimal,
    pub closing_balance: Option<Decimal>,
    pub status: CashRegisterStatus,
    pub movements: Vec<Movement>,
    pub notes: Option<String>,
}

impl CashRegister {
    pub fn is_open(&self) -> bool {
        self.status == CashRegisterStatus::Open
    }

    pub fn total_entries(&self) -> Decimal {
        self.total_for(MovementType::Entry)
    }

    pub fn total_exits(&self) -> Decimal {
        self.total_for(MovementType::Exit)
    }

    /// opening balance + entries - exits, saturating at the `Decimal` bounds
    pub fn running_balance(&self) -> Decimal {
        self.opening_balance
            .saturating_add(self.total_entries())
            .saturating_sub(self.total_exits())
    }

    /// Counted minus computed, once the register is closed
    pub fn discrepancy(&self) -> Option<Decimal> {
        self.closing_balance
            .map(|closing| closing.saturating_sub(self.running_balance()))
    }

    /// Running balance after appending `amount` of `kind`, or `None` when a
    /// total or the balance would leave the representable range.
    pub fn checked_balance_with(&self, kind: MovementKind, amount: Decimal) -> Option<Decimal> {
        let mut entries = self.checked_total_for(MovementType::Entry)?;
        let mut exits = self.checked_total_for(MovementType::Exit)?;
        match kind.direction() {
            MovementType::Entry => entries = entries.checked_add(amount)?,
            MovementType::Exit => exits = exits.checked_add(amount)?,
        }
        self.opening_balance.checked_add(entries)?.checked_sub(exits)
    }

    /// Last `n` movements, newest first
    pub fn recent_movements(&self, n: usize) -> Vec<&Movement> {
        self.movements.iter().rev().take(n).collect()
    }

    fn total_for(&self, movement_type: MovementType) -> Decimal {
        self.movements
            .iter()
            .filter(|m| m.movement_type() == movement_type)
            .fold(Decimal::ZERO, |total, m| total.saturating_add(m.amount))
    }

    fn checked_total_for(&self, movement_type: MovementType) -> Option<Decimal> {
        self.movements
            .iter()
            .filter(|m| m.movement_type() == movement_type)
            .try_fold(Decimal::ZERO, |total, m| total.checked_add(m.amount))
    }
}

/// Values needed to open a register; ids and status are assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCashRegister {
    pub context: String,
    pub number: u32,
    pub opening_balance: Decimal,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub kind: MovementKind,
    pub amount: Decimal,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterClosing {
    pub closing_balance: Decimal,
    pub notes: String,
    pub closed_at: DateTime<Utc>,
}
