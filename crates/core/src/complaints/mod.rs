//! Complaints list logic: query state, generation tagging, reconciliation.

pub mod controller;
pub mod ports;

pub use controller::{ComplaintListController, ListState};
pub use ports::ComplaintsGateway;
