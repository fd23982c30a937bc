//! Elixir cross-referencer REST client.

use crate::config::IndexConfig;
use crate::error::{LxqError, Result};
use crate::types::Family;
use crate::xref::{CrossReferenceIndex, RawLookup};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::debug;

const BACKEND: &str = "elixir";
const USER_AGENT: &str = concat!("lxq/", env!("CARGO_PKG_VERSION"));

/// Queries `GET {url}/api/ident/{project}/{ident}?version=..&family=..`.
#[derive(Debug, Clone)]
pub struct ElixirHttpIndex {
    client: Client,
    base: Url,
    project: String,
}

impl ElixirHttpIndex {
    /// Builds a client from `config`; `config.url` must be set.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| LxqError::ConfigError("index.url is not set".to_string()))?;
        let base = Url::parse(url)
            .map_err(|e| LxqError::ConfigError(format!("invalid index url {url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(LxqError::ConfigError(format!(
                "index url {url:?} cannot carry a path"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            client,
            base,
            project: config.project.clone(),
        })
    }

    fn endpoint(&self, ident: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| LxqError::ConfigError(format!("index url {} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(["api", "ident", self.project.as_str(), ident]);
        Ok(url)
    }
}

impl CrossReferenceIndex for ElixirHttpIndex {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn query(&self, version: &str, ident: &str, family: Family) -> Result<RawLookup> {
        let url = self.endpoint(ident)?;
        debug!(%url, version, %family, "querying index");

        let response = self
            .client
            .get(url)
            .query(&[("version", version), ("family", family.as_str())])
            .send()
            .map_err(unavailable)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LxqError::NotIndexed {
                version: version.to_string(),
            }),
            status if !status.is_success() => Err(LxqError::BackendUnavailable {
                backend: BACKEND,
                reason: format!("index answered {status}"),
            }),
            _ => response.json::<RawLookup>().map_err(|e| LxqError::BackendUnavailable {
                backend: BACKEND,
                reason: format!("malformed index response: {e}"),
            }),
        }
    }
}

fn unavailable(e: reqwest::Error) -> LxqError {
    let reason = if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("cannot connect: {e}")
    } else {
        e.to_string()
    };
    LxqError::BackendUnavailable {
        backend: BACKEND,
        reason,
    }
}
