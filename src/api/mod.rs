pub mod approvals;
pub mod events;
pub mod handler;
pub mod models;
pub mod swaps;
