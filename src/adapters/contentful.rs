use crate::core::ConfigProvider;
use crate::domain::model::Entry;
use crate::domain::ports::{ContentSource, EntryQuery};
use crate::utils::error::{JournalError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_API_BASE: &str = "https://cdn.contentful.com";

#[derive(Debug, Default, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default, rename = "Asset")]
    assets: Vec<Value>,
    #[serde(default, rename = "Entry")]
    entries: Vec<Value>,
}

fn sys_id(value: &Value) -> Option<&str> {
    value.pointer("/sys/id").and_then(Value::as_str)
}

fn link_target(value: &Value) -> Option<(&str, &str)> {
    let sys = value.get("sys")?;
    if sys.get("type")?.as_str()? != "Link" {
        return None;
    }
    Some((sys.get("linkType")?.as_str()?, sys.get("id")?.as_str()?))
}

/// Index of everything a response can link to.
struct LinkIndex {
    assets: HashMap<String, Value>,
    entries: HashMap<String, Value>,
    // (linkType, id, 剩餘深度) -> 已展開的目標
    resolved: RefCell<HashMap<(String, String, u8), Value>>,
}

impl LinkIndex {
    fn new(includes: Includes, items: &[Value]) -> Self {
        let index = |values: Vec<Value>| -> HashMap<String, Value> {
            values
                .into_iter()
                .filter_map(|value| {
                    let id = sys_id(&value)?.to_string();
                    Some((id, value))
                })
                .collect()
        };

        let mut entries = index(includes.entries);
        // 回應本身的 items 不會重複出現在 includes 裡
        entries.extend(index(items.to_vec()));

        Self {
            assets: index(includes.assets),
            entries,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Replaces link objects with their targets, `depth` levels deep.
    /// Links that cannot be resolved are kept as they are.
    fn resolve(&self, value: &Value, depth: u8) -> Value {
        match value {
            Value::Object(map) => {
                if let Some((link_type, id)) = link_target(value) {
                    let target = match link_type {
                        "Asset" => self.assets.get(id),
                        "Entry" => self.entries.get(id),
                        _ => None,
                    };
                    return match target {
                        Some(target) if depth > 0 => {
                            self.resolve_target(link_type, id, target, depth - 1)
                        }
                        _ => {
                            tracing::debug!(link_type, id, "leaving unresolved link in place");
                            value.clone()
                        }
                    };
                }
                Value::Object(
                    map.iter()
                        .map(|(key, child)| (key.clone(), self.resolve(child, depth)))
                        .collect(),
                )
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.resolve(item, depth)).collect())
            }
            other => other.clone(),
        }
    }

    /// Each target is expanded once per remaining depth, so entries that
    /// link to each other are not re-walked for every occurrence.
    fn resolve_target(&self, link_type: &str, id: &str, target: &Value, depth: u8) -> Value {
        let key = (link_type.to_string(), id.to_string(), depth);
        let cached = self.resolved.borrow().get(&key).cloned();
        if let Some(cached) = cached {
            return cached;
        }

        let value = self.resolve(target, depth);
        self.resolved.borrow_mut().insert(key, value.clone());
        value
    }
}

impl EntriesResponse {
    fn into_entries(self, include: u8) -> Vec<Entry> {
        let index = LinkIndex::new(self.includes, &self.items);

        self.items
            .iter()
            .filter_map(|item| {
                let Some(id) = sys_id(item) else {
                    tracing::warn!("skipping content item without sys.id");
                    return None;
                };
                let content_type = item
                    .pointer("/sys/contentType/sys/id")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let fields = item
                    .get("fields")
                    .map(|fields| index.resolve(fields, include))
                    .unwrap_or(Value::Null);
                Some(Entry::new(id, content_type, fields))
            })
            .collect()
    }
}

/// Client for the Contentful Content Delivery API.
#[derive(Debug, Clone)]
pub struct ContentfulClient {
    client: Client,
    api_base: String,
    space_id: String,
    environment: String,
    access_token: String,
}

impl ContentfulClient {
    pub fn new(
        api_base: impl Into<String>,
        space_id: impl Into<String>,
        environment: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            space_id: space_id.into(),
            environment: environment.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            config.api_base(),
            config.space_id(),
            config.environment(),
            config.access_token(),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.api_base.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }
}

impl ContentSource for ContentfulClient {
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        let url = self.entries_url();
        tracing::debug!("Requesting {} entries from {}", query.content_type, url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("content_type", query.content_type.clone()),
                ("include", query.include.to_string()),
                ("limit", query.limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Content API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|error| error.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(JournalError::ContentApiError {
                status: status.as_u16(),
                message,
            });
        }

        let payload: EntriesResponse = response.json().await?;
        let entries = payload.into_entries(query.include);
        tracing::info!("Fetched {} {} entries", entries.len(), query.content_type);
        Ok(entries)
    }
}

/// Runs a fetch tied to a view's lifetime. Once `token` is cancelled the
/// result is thrown away and `Ok(None)` comes back instead.
pub async fn fetch_until_cancelled<K: ContentSource>(
    source: &K,
    query: &EntryQuery,
    token: &CancellationToken,
) -> Result<Option<Vec<Entry>>> {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = source.get_entries(query) => Some(result),
    };

    match result {
        Some(result) if !token.is_cancelled() => result.map(Some),
        _ => {
            tracing::info!(
                content_type = %query.content_type,
                "fetch cancelled, discarding result"
            );
            Ok(None)
        }
    }
}
