//! Core business logic for the CivicLink client
//!
//! Everything here sits behind port traits so the HTTP layer (and test
//! doubles) can be swapped in from outside:
//!
//! - [`complaints`]: the paginated, filtered, searchable list controller
//! - [`assignment`]: assignment mutations with pending/committed/failed phases
//! - [`selection`]: one-shot selection request/response channels

pub mod assignment;
pub mod complaints;
pub mod selection;

pub use assignment::{AssignmentGateway, AssignmentTracker, MutationPhase};
pub use complaints::{ComplaintListController, ComplaintsGateway, ListState};
pub use selection::SelectionBroker;
