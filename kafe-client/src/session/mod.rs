//! Session containers: one per customer table, one per staff dashboard

mod customer;
mod dashboard;

pub use customer::CustomerSession;
pub use dashboard::{DashboardSession, SettlementOutcome};
