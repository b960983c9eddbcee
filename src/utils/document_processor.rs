use crate::core::layout::PatentDocument;
use crate::core::parser::{parse, Parser, UniversalParser};
use crate::error::{FetchError, ParseError, ProcessorError, ResolutionError};
use crate::number::normalizer::normalize;
use crate::number::resolver::{Resolver, SearchCapability, SearchRecord};
use crate::DocumentKind;
use async_trait::async_trait;
use log::{debug, info, warn};
use rayon::prelude::*;

/// Download access for full-text XML documents, implemented by the HTTP layer.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Resolves a free-form patent number, locates its full-text XML, downloads
/// it and decodes it.
pub struct DocumentProcessor<S, F> {
    resolver: Resolver<S>,
    fetcher: F,
    parser: UniversalParser,
}

impl<S: SearchCapability, F: DocumentFetcher> DocumentProcessor<S, F> {
    pub fn new(resolver: Resolver<S>, fetcher: F) -> Self {
        Self {
            resolver,
            fetcher,
            parser: UniversalParser::new(),
        }
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Fetch and parse the document for an application, grant or
    /// publication number. The grant XML is preferred when the patent has
    /// issued; otherwise the published application XML is used.
    pub async fn process(&self, patent_number: &str) -> Result<PatentDocument, ProcessorError> {
        let pn = normalize(patent_number).map_err(ResolutionError::from)?;
        info!("Processing patent number {}", pn);

        let application_number = self.resolver.resolve(&pn).await?;
        info!("Resolved {} to application {}", pn.normalized(), application_number);

        let (url, kind) = self.xml_location(&application_number).await?;
        info!("Fetching {} XML from {}", kind, url);

        let bytes = self.fetcher.fetch(&url).await?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);

        self.process_bytes(&bytes, Some(kind))
    }

    /// XML location and grammar for an application number.
    pub async fn xml_location(
        &self,
        application_number: &str,
    ) -> Result<(String, DocumentKind), ProcessorError> {
        let record = self.resolver.find_record(application_number).await?;
        select_xml_location(&record).ok_or_else(|| {
            warn!("No XML document URL for application {}", application_number);
            ProcessorError::NoDocumentUrl(application_number.to_string())
        })
    }

    /// Parse bytes already at hand, with an optional grammar hint.
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        expected: Option<DocumentKind>,
    ) -> Result<PatentDocument, ProcessorError> {
        Ok(parse(bytes, expected)?)
    }

    /// Auto-detect and parse many documents in parallel. Results are in
    /// input order, one per buffer.
    pub fn parse_batch<B>(&self, inputs: &[B]) -> Vec<Result<PatentDocument, ParseError>>
    where
        B: AsRef<[u8]> + Sync,
    {
        info!("Parsing batch of {} documents", inputs.len());
        let results: Vec<_> = inputs
            .par_iter()
            .map(|input| self.parser.parse(input.as_ref()))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("{} of {} documents failed to parse", failed, inputs.len());
        }
        results
    }
}

fn select_xml_location(record: &SearchRecord) -> Option<(String, DocumentKind)> {
    let non_empty = |uri: &Option<String>| {
        uri.as_deref()
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    };

    non_empty(&record.grant_xml_uri)
        .map(|url| (url, DocumentKind::Grant))
        .or_else(|| {
            non_empty(&record.application_xml_uri).map(|url| (url, DocumentKind::Application))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_uri_preferred() {
        let record = SearchRecord {
            application_number: Some("17248024".to_string()),
            grant_xml_uri: Some("https://example.test/grant.xml".to_string()),
            application_xml_uri: Some("https://example.test/app.xml".to_string()),
        };
        assert_eq!(
            select_xml_location(&record),
            Some(("https://example.test/grant.xml".to_string(), DocumentKind::Grant))
        );
    }

    #[test]
    fn test_application_uri_fallback() {
        let record = SearchRecord {
            application_number: None,
            grant_xml_uri: Some(String::new()),
            application_xml_uri: Some("https://example.test/app.xml".to_string()),
        };
        assert_eq!(
            select_xml_location(&record),
            Some(("https://example.test/app.xml".to_string(), DocumentKind::Application))
        );
        assert_eq!(select_xml_location(&SearchRecord::default()), None);
    }
}
