//! User-facing notifications derived from live changes and failed writes

use shared::models::{CallType, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Dashboard: a table placed an order
    NewOrder { order_id: i64, table_no: String },
    /// Dashboard: a table is calling staff
    NewCall {
        call_id: i64,
        table_no: String,
        call_type: CallType,
    },
    /// Customer: the kitchen received the order
    OrderConfirmed { order_id: i64 },
    /// Customer: an order moved forward
    StatusChanged { order_id: i64, status: OrderStatus },
    /// Customer: the table was settled
    PaymentReceived { order_id: i64 },
    /// A local change was rolled back
    WriteFailed { message: String },
    /// Settlement did not complete; the table is unchanged
    SettlementFailed {
        table_no: String,
        retryable: bool,
        reason: String,
    },
}

impl Notice {
    /// Dashboard alerts play a sound
    pub fn plays_sound(&self) -> bool {
        matches!(self, Self::NewOrder { .. } | Self::NewCall { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::WriteFailed { .. } | Self::SettlementFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_only_for_staff_alerts() {
        assert!(
            Notice::NewOrder {
                order_id: 1,
                table_no: "2".into()
            }
            .plays_sound()
        );
        assert!(!Notice::PaymentReceived { order_id: 1 }.plays_sound());
        assert!(
            Notice::WriteFailed {
                message: "x".into()
            }
            .is_error()
        );
    }
}
