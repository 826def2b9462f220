//! Client for the Stackalytics contributor statistics API.

use crate::config::StackalyticsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One engineer row of `/api/1.0/stats/engineers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerStat {
    pub id: String,
    pub metric: f64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineersResponse {
    #[serde(default)]
    stats: Vec<EngineerStat>,
}

/// Source of per-contributor activity metrics.
pub trait ContributorStats {
    async fn engineers(&self, module: Option<&str>, metric: &str) -> Result<Vec<EngineerStat>>;
}

pub struct StackalyticsClient {
    client: reqwest::Client,
    base_url: String,
    release: String,
}

impl StackalyticsClient {
    pub fn new(config: &StackalyticsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("time-to-merge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            release: config.release.clone(),
        })
    }
}

impl ContributorStats for StackalyticsClient {
    async fn engineers(&self, module: Option<&str>, metric: &str) -> Result<Vec<EngineerStat>> {
        let url = format!("{}/api/1.0/stats/engineers", self.base_url);

        let mut params = vec![("release", self.release.as_str()), ("metric", metric)];
        if let Some(module) = module {
            params.push(("module", module));
        }
        debug!("GET {} {:?}", url, params);

        let response: EngineersResponse = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Failed to reach Stackalytics at {}", url))?
            .error_for_status()
            .with_context(|| format!("Stackalytics rejected the {} query", metric))?
            .json()
            .await
            .context("Unexpected Stackalytics response")?;

        Ok(response.stats)
    }
}

/// Index rows by engineer id.
pub fn by_engineer(rows: &[EngineerStat]) -> HashMap<&str, f64> {
    rows.iter().map(|row| (row.id.as_str(), row.metric)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StackalyticsClient {
        let mut config = Config::default().stackalytics;
        config.base_url = format!("{}/", server.uri());
        StackalyticsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetches_module_scoped_metric() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1.0/stats/engineers"))
            .and(query_param("module", "neutron"))
            .and(query_param("metric", "marks"))
            .and(query_param("release", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"stats":[{"id":"alice","metric":120,"name":"Alice","index":1},
                             {"id":"bob","metric":7.5,"name":"Bob","index":2}]}"#,
            ))
            .mount(&server)
            .await;

        let rows = client_for(&server).engineers(Some("neutron"), "marks").await.unwrap();
        assert_eq!(rows.len(), 2);
        let index = by_engineer(&rows);
        assert_eq!(index["alice"], 120.0);
        assert_eq!(index["bob"], 7.5);
    }

    #[tokio::test]
    async fn empty_stats_are_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1.0/stats/engineers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"stats":[]}"#))
            .mount(&server)
            .await;

        let rows = client_for(&server).engineers(None, "emails").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(client_for(&server).engineers(None, "emails").await.is_err());
    }
}
