//! Order Model
//!
//! ```text
//!   create (customer)      advance (staff)         advance (staff)
//!  ─────────────────► new ───────────────► preparing ───────────────► done
//!                      │                      │                        │
//!                      └──────────────┬───────┴────────────────────────┘
//!                                     ▼  settle (table settlement only)
//!                                    paid   (terminal, history only)
//! ```
//!
//! Statuses only move forward. A request that would not move an order forward
//! is a no-op, never an error.

use crate::error::{AppError, ErrorCode};
use crate::money;
use serde::{Deserialize, Serialize};

/// Order status, ordered `new < preparing < done < paid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    New,
    Preparing,
    Done,
    Paid,
}

/// Result of applying a status change to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Status moves forward to the target
    Applied,
    /// Already at or past the target; nothing changes
    NoOp,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [Self::New, Self::Preparing, Self::Done, Self::Paid];

    /// Position in the lifecycle
    pub const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Preparing => 1,
            Self::Done => 2,
            Self::Paid => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Preparing => "preparing",
            Self::Done => "done",
            Self::Paid => "paid",
        }
    }

    /// Paid orders leave every live view
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Decide whether moving to `target` changes anything
    pub fn transition(self, target: OrderStatus) -> Transition {
        if target > self {
            Transition::Applied
        } else {
            Transition::NoOp
        }
    }

    /// Statuses an order may be in for a move to `self` to apply
    pub fn predecessors(self) -> Vec<OrderStatus> {
        Self::ALL.into_iter().filter(|s| *s < self).collect()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status a staff member may advance an order to
///
/// `paid` is reachable only through table settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTarget {
    Preparing,
    Done,
}

impl AdvanceTarget {
    pub const fn status(self) -> OrderStatus {
        match self {
            Self::Preparing => OrderStatus::Preparing,
            Self::Done => OrderStatus::Done,
        }
    }
}

impl TryFrom<OrderStatus> for AdvanceTarget {
    type Error = AppError;

    fn try_from(status: OrderStatus) -> Result<Self, Self::Error> {
        match status {
            OrderStatus::Preparing => Ok(Self::Preparing),
            OrderStatus::Done => Ok(Self::Done),
            other => Err(AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Orders cannot be advanced to '{}'", other),
            )
            .with_detail("target", other.as_str())),
        }
    }
}

/// Immutable line snapshot captured when the order is placed
///
/// Later product edits never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        money::to_f64(money::line_total(self.unit_price, self.quantity))
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    /// Plain table number, not a reference to the table record
    pub table_no: String,
    pub total_price: f64,
    pub status: OrderStatus,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub created_at: i64,
}

impl Order {
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Customer order submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_no: String,
    pub items: Vec<OrderItem>,
    /// Total computed by the submitting client
    pub total_price: f64,
}

impl OrderCreate {
    /// Sum of the submitted lines
    pub fn computed_total(&self) -> f64 {
        money::to_f64(money::sum_lines(
            self.items.iter().map(|i| (i.unit_price, i.quantity)),
        ))
    }

    /// Structural checks every submission must pass
    pub fn validate(&self) -> Result<(), AppError> {
        if self.table_no.trim().is_empty() {
            return Err(AppError::new(ErrorCode::TableNotResolved));
        }
        if self.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(AppError::new(ErrorCode::OrderInvalidQuantity)
                    .with_detail("product_id", item.product_id));
            }
            if !money::is_valid_price(item.unit_price) {
                return Err(AppError::new(ErrorCode::ProductInvalidPrice)
                    .with_detail("product_id", item.product_id));
            }
        }
        let declared = money::to_decimal(self.total_price);
        let computed = money::sum_lines(self.items.iter().map(|i| (i.unit_price, i.quantity)));
        if !money::amounts_match(declared, computed) {
            return Err(AppError::new(ErrorCode::OrderTotalMismatch)
                .with_detail("declared", self.total_price)
                .with_detail("computed", money::to_f64(computed)));
        }
        Ok(())
    }
}

/// Staff status change request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub status: OrderStatus,
}

/// Result of an advance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub order: Order,
    /// false when the order was already at or past the target
    pub changed: bool,
}
