use crate::error::{config::ConfigError, AppError};

/// Per-bot connection settings.
///
/// Each entry names one game-network client relay the process should bind a
/// pool slot to. The relay speaks the line-delimited JSON protocol described
/// in `lobby::relay`.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub id: i32,
    pub relay_addr: String,
}

/// Third-party statistics service settings.
#[derive(Clone, Debug)]
pub struct StatsConfig {
    pub enabled: bool,
    pub base_url: String,
    pub interval_hours: u64,
    pub min_interval_ms: u64,
}

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,
    pub master_channel_id: u64,
    pub command_prefix: String,

    /// Reconciliation tick period, in seconds.
    pub update_interval_secs: u64,
    /// When set, lobbies never auto-start on reaching the seat count.
    pub disable_autostart: bool,
    /// When set, the first non-zero match id reported by the game network is
    /// persisted to the event.
    pub save_match_ids: bool,

    pub bots: Vec<BotConfig>,
    pub stats: StatsConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            discord_bot_token: require("DISCORD_BOT_TOKEN")?,
            master_channel_id: parse_var("MASTER_CHANNEL_ID", require("MASTER_CHANNEL_ID")?)?,
            command_prefix: std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!sb".to_string()),
            update_interval_secs: parse_or("UPDATE_INTERVAL_SECS", 60)?,
            disable_autostart: parse_or("DISABLE_AUTOSTART", false)?,
            save_match_ids: parse_or("SAVE_MATCH_IDS", false)?,
            bots: parse_bot_relays(&require("BOT_RELAYS")?)?,
            stats: StatsConfig {
                enabled: parse_or("STATS_ENABLED", false)?,
                base_url: std::env::var("STATS_BASE_URL")
                    .unwrap_or_else(|_| "https://api.opendota.com/api".to_string()),
                interval_hours: parse_or("STATS_INTERVAL_HOURS", 8)?,
                min_interval_ms: parse_or("STATS_MIN_INTERVAL_MS", 2000)?,
            },
        })
    }
}

fn require(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
}

fn parse_var<T: std::str::FromStr>(var: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value,
    })
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => parse_var(var, value),
        Err(_) => Ok(default),
    }
}

/// Parses the `BOT_RELAYS` variable: comma-separated `id=host:port` pairs,
/// e.g. `1=127.0.0.1:9101,2=127.0.0.1:9102`.
fn parse_bot_relays(value: &str) -> Result<Vec<BotConfig>, ConfigError> {
    let mut bots = Vec::new();

    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (id, addr) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            var: "BOT_RELAYS".to_string(),
            value: value.to_string(),
        })?;

        bots.push(BotConfig {
            id: id.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "BOT_RELAYS".to_string(),
                value: value.to_string(),
            })?,
            relay_addr: addr.trim().to_string(),
        });
    }

    if bots.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "BOT_RELAYS".to_string(),
            value: value.to_string(),
        });
    }

    Ok(bots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bot_relay_pairs() {
        let bots = parse_bot_relays("1=127.0.0.1:9101, 2=10.0.0.5:9102").unwrap();

        assert_eq!(bots.len(), 2);
        assert_eq!(bots[0].id, 1);
        assert_eq!(bots[0].relay_addr, "127.0.0.1:9101");
        assert_eq!(bots[1].id, 2);
        assert_eq!(bots[1].relay_addr, "10.0.0.5:9102");
    }

    #[test]
    fn rejects_empty_relay_list() {
        assert!(parse_bot_relays("").is_err());
    }

    #[test]
    fn rejects_malformed_relay_pair() {
        assert!(parse_bot_relays("1:127.0.0.1").is_err());
        assert!(parse_bot_relays("one=127.0.0.1:9101").is_err());
    }
}
