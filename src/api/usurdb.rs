//! [U.S. Utility Rate Database][1] client on OpenEI.org.
//!
//! An API key is required; sign up at <https://openei.org/services/api/signup/>.
//!
//! [1]: https://openei.org/services/doc/rest/util_rates/

use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub struct Api {
    client: Client,
    api_key: String,
    extra_parameters: BTreeMap<String, String>,
}

impl Api {
    pub fn try_new(api_key: String, extra_parameters: BTreeMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, api_key, extra_parameters })
    }

    /// Fetch one page of utility rate records, starting at `offset`.
    ///
    /// The items are returned as raw JSON values so that a single malformed
    /// record can be skipped without losing the page.
    #[instrument(skip_all, fields(offset = offset, limit = limit))]
    pub async fn get_rates_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>> {
        let query = serde_qs::to_string(&GetRatesQuery {
            version: 7,
            format: "json",
            detail: "full",
            api_key: &self.api_key,
            limit,
            offset,
            extra: &self.extra_parameters,
        })
        .context("failed to serialize the request parameters")?;
        let response = self
            .client
            .get(format!("https://api.openei.org/utility_rates?{query}"))
            .send()
            .await
            .context("failed to call the utility rates API")?
            .error_for_status()
            .context("the utility rates request failed")?
            .json::<GetRatesResponse>()
            .await
            .context("failed to deserialize the utility rates response")?;
        debug!(n_items = response.items.len(), "Fetched");
        Ok(response.items)
    }
}

#[derive(Serialize)]
struct GetRatesQuery<'a> {
    version: u8,

    format: &'a str,

    detail: &'a str,

    api_key: &'a str,

    limit: usize,

    offset: usize,

    #[serde(flatten)]
    extra: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct GetRatesResponse {
    items: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_rates_page_ok() -> Result {
        let api = Api::try_new(std::env::var("OPENEI_API_KEY")?, BTreeMap::new())?;
        let items = api.get_rates_page(0, 5).await?;
        assert!(!items.is_empty());
        assert!(items.len() <= 5);
        Ok(())
    }
}
