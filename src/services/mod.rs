//! Service layer for order-undo
//!
//! Business operations built on the undo log: a reference order gateway
//! that backs up before mutating, and the administrative undo surface.

pub mod admin;
pub mod order;

pub use admin::{AdminResponse, AdminService};
pub use order::{OrderChange, OrderService};
