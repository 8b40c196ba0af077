//! Pure domain types for the CivicLink client core.
//!
//! No I/O and no async here: this crate defines the complaint, user, and
//! query vocabulary plus the error taxonomy shared by every other crate in
//! the workspace.

pub mod errors;
pub mod types;

pub use errors::{ApiError, Result};
pub use types::{
    AssignComplaintRequest, AssignmentReceipt, Complaint, ComplaintFilters, ComplaintPage,
    ComplaintQuery, ComplaintStatus, Department, LoginRequest, Pagination, UiStatus, User, Zone,
    DEFAULT_PAGE_SIZE,
};
