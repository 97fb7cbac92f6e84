//! Error types for the scheduler.
//!
//! `AppError` is the top-level error type aggregating infrastructure errors
//! (database, Discord, HTTP, cron) behind `#[from]` conversions. Domain
//! outcomes with defined handling, like pool exhaustion or a remote lobby
//! rejection, live in their own enums under `lobby` so callers can match on
//! them without digging through the aggregate.

pub mod config;
pub mod lobby;

use thiserror::Error;

use crate::error::config::ConfigError;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// HTTP client request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Game-network client error.
    #[error(transparent)]
    NetworkErr(#[from] crate::lobby::network::NetworkError),

    /// Resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as
/// serenity::Error is very large and would make all variants larger if not
/// boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
