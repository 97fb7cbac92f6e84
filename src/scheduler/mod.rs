//! Background jobs: lobby reconciliation and rating refresh.

pub mod reconcile;
pub mod stats_refresh;
