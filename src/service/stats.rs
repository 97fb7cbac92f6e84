//! Solo rating lookups against the OpenDota API.

use crate::error::AppError;

/// Offset between a 64-bit account id and the 32-bit id OpenDota uses.
const STEAM64_BASE: u64 = 76_561_197_960_265_728;

/// Thin client for the public player stats API.
pub struct StatsClient {
    client: reqwest::Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(base_url: String) -> Self {
        StatsClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a player's solo rating.
    ///
    /// # Returns
    ///
    /// `None` when the rating is hidden, unset or the account id cannot be
    /// derived. Transport failures are returned as errors so the caller can
    /// decide whether to keep the stale value.
    pub async fn solo_mmr(&self, steam_id: &str) -> Result<Option<i32>, AppError> {
        let Some(account_id) = account_id(steam_id) else {
            return Ok(None);
        };

        let url = format!("{}/players/{account_id}", self.base_url);
        let body: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_rank(&body))
    }
}

/// Converts a 64-bit account id to the 32-bit form the API expects.
fn account_id(steam_id: &str) -> Option<u64> {
    let id: u64 = steam_id.parse().ok()?;
    id.checked_sub(STEAM64_BASE)
}

/// The rank field arrives as a number, a numeric string, or null depending
/// on profile visibility.
fn parse_rank(body: &serde_json::Value) -> Option<i32> {
    match &body["solo_competitive_rank"] {
        serde_json::Value::Number(n) => n.as_i64().map(|v| v as i32),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_strips_the_steam64_base() {
        assert_eq!(account_id("76561198000000001"), Some(39_734_273));
        assert_eq!(account_id("notanid"), None);
        assert_eq!(account_id("1234"), None);
    }

    #[test]
    fn rank_parses_from_number_string_or_null() {
        assert_eq!(parse_rank(&serde_json::json!({"solo_competitive_rank": 5120})), Some(5120));
        assert_eq!(
            parse_rank(&serde_json::json!({"solo_competitive_rank": "4333"})),
            Some(4333)
        );
        assert_eq!(parse_rank(&serde_json::json!({"solo_competitive_rank": null})), None);
        assert_eq!(parse_rank(&serde_json::json!({})), None);
    }
}
