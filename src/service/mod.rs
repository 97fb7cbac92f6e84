//! Domain services sitting between the command surface and the data layer.

pub mod confirmation;
pub mod event;
pub mod stats;
pub mod summary;

pub use confirmation::{ConfirmOutcome, ConfirmationService};
pub use event::{AddInhouseOutcome, EventService};
pub use stats::StatsClient;
pub use summary::SummaryRenderer;
