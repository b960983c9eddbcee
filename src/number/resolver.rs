use crate::config::ResolverConfig;
use crate::error::{ResolutionError, SearchError};
use crate::number::normalizer::{normalize, PatentKind, PatentNumber};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One record returned by the patent search index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub application_number: Option<String>,
    /// Location of the grant full-text XML, once granted
    pub grant_xml_uri: Option<String>,
    /// Location of the published application full-text XML
    pub application_xml_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchRecord>,
}

/// Query access to the patent search index, implemented by the HTTP layer.
#[async_trait]
pub trait SearchCapability: Send + Sync {
    async fn search(
        &self,
        query: &str,
        offset: u32,
        limit: u32,
    ) -> Result<SearchResponse, SearchError>;
}

/// Resolves grant and publication numbers to application numbers with a
/// single search call. Retries are left to the caller.
pub struct Resolver<S> {
    search: S,
    config: ResolverConfig,
}

impl<S: SearchCapability> Resolver<S> {
    pub fn new(search: S) -> Self {
        Self::with_config(search, ResolverConfig::default())
    }

    pub fn with_config(search: S, config: ResolverConfig) -> Self {
        Self { search, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    /// Normalize a free-form identifier, then resolve it.
    pub async fn resolve_str(&self, input: &str) -> Result<String, ResolutionError> {
        let pn = normalize(input)?;
        self.resolve(&pn).await
    }

    pub async fn resolve(&self, pn: &PatentNumber) -> Result<String, ResolutionError> {
        self.resolve_with_cancel(pn, std::future::pending()).await
    }

    /// Resolve and return a completed copy of `pn`.
    pub async fn complete(&self, pn: &PatentNumber) -> Result<PatentNumber, ResolutionError> {
        let application_number = self.resolve(pn).await?;
        Ok(pn.with_application_number(application_number))
    }

    /// Resolve `pn`, abandoning the search with `ResolutionError::Cancelled`
    /// as soon as `cancel` completes.
    pub async fn resolve_with_cancel<C>(
        &self,
        pn: &PatentNumber,
        cancel: C,
    ) -> Result<String, ResolutionError>
    where
        C: Future<Output = ()>,
    {
        let (kind, field, value) = match pn.kind() {
            PatentKind::Application => return Ok(pn.to_application_number().to_string()),
            PatentKind::Grant => (
                "grant",
                &self.config.grant_query_field,
                pn.normalized().to_string(),
            ),
            PatentKind::Publication => (
                "publication",
                &self.config.publication_query_field,
                self.publication_query_value(pn.normalized()),
            ),
            PatentKind::Unknown => {
                return Err(ResolutionError::UnsupportedKind(pn.original().to_string()))
            }
        };

        let query = format!("{}:{}", field, value);
        debug!("Resolving {} number {} with query {}", kind, pn.normalized(), query);

        let response = tokio::select! {
            result = self.bounded_search(&query) => result?,
            _ = cancel => return Err(ResolutionError::Cancelled),
        };
        let response = response.map_err(|source| ResolutionError::Search {
            number: pn.normalized().to_string(),
            source,
        })?;

        let Some(record) = response.results.into_iter().next() else {
            warn!("No application found for {} number {}", kind, pn.normalized());
            return Err(ResolutionError::NotFound {
                kind,
                number: pn.normalized().to_string(),
            });
        };

        record
            .application_number
            .ok_or_else(|| ResolutionError::MalformedResponse {
                kind,
                number: pn.normalized().to_string(),
            })
    }

    /// Fetch the index record for an application number.
    pub async fn find_record(
        &self,
        application_number: &str,
    ) -> Result<SearchRecord, ResolutionError> {
        let query = format!("{}:{}", self.config.application_query_field, application_number);
        debug!("Looking up application record with query {}", query);

        let response = self
            .bounded_search(&query)
            .await?
            .map_err(|source| ResolutionError::Search {
                number: application_number.to_string(),
                source,
            })?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::NotFound {
                kind: "application",
                number: application_number.to_string(),
            })
    }

    /// `20250087686` -> `US20250087686A1`; values already carrying the
    /// country prefix are passed through.
    fn publication_query_value(&self, normalized: &str) -> String {
        let prefix = &self.config.publication_prefix;
        if normalized.len() == 11 && !normalized.starts_with(prefix.as_str()) {
            format!("{}{}{}", prefix, normalized, self.config.publication_kind_code)
        } else {
            normalized.to_string()
        }
    }

    async fn bounded_search(
        &self,
        query: &str,
    ) -> Result<Result<SearchResponse, SearchError>, ResolutionError> {
        let call = self.search.search(query, 0, 1);
        match self.config.query_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ResolutionError::TimedOut(limit)),
            None => Ok(call.await),
        }
    }
}
