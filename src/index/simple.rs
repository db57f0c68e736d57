//! Client for supplementary indexes that publish a simple HTML listing.

use crate::index::catalog::{Catalog, CatalogCache};
use crate::model::SourceIndex;
use crate::traits::{IndexClient, IndexError};
use crate::wheel::{is_wheel, normalize};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, warn};

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<a\s[^>]*>(.*?)</a>").expect("anchor pattern is valid")
});

/// Text of every `<a ...>text</a>` pair in an HTML page, trimmed.
pub fn anchor_texts(html: &str) -> Vec<String> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Supplementary index reachable at `{base_url}/` (catalog) and
/// `{base_url}/{name}/` (per-package file listing).
pub struct SimpleIndexClient {
    client: Client,
    base_url: String,
    source: SourceIndex,
    catalog: CatalogCache,
}

impl SimpleIndexClient {
    pub fn new(client: Client, base_url: &str, source: SourceIndex) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            source,
            catalog: CatalogCache::new(),
        }
    }

    /// Catalog of every package on this index, fetched at most once per client.
    ///
    /// `Ok(None)` when an earlier attempt failed; the client then stops asking
    /// for the catalog and queries listings directly.
    pub async fn catalog(&self) -> Result<Option<Catalog>, IndexError> {
        self.catalog.get_or_fetch(|| self.fetch_catalog()).await
    }

    async fn fetch_catalog(&self) -> Result<HashSet<String>, IndexError> {
        let body = self.get_text(&format!("{}/", self.base_url)).await?;
        let names: HashSet<String> = anchor_texts(&body)
            .iter()
            .map(|name| normalize(name))
            .collect();
        debug!(source = %self.source, entries = names.len(), "Fetched catalog");
        Ok(names)
    }

    async fn get_text(&self, url: &str) -> Result<String, IndexError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::Status {
                source_index: self.source,
                status: response.status().as_u16(),
            });
        }
        response.text().await.map_err(|e| IndexError::Decode {
            source_index: self.source,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl IndexClient for SimpleIndexClient {
    fn source(&self) -> SourceIndex {
        self.source
    }

    async fn fetch_listing(&self, name: &str) -> Result<Option<Vec<String>>, IndexError> {
        match self.catalog().await {
            Ok(Some(catalog)) if !catalog.contains(name) => {
                debug!(source = %self.source, package = name, "Not in catalog");
                return Ok(None);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(source = %self.source, error = %e, "Catalog unavailable, querying listing directly");
            }
        }

        let body = self
            .get_text(&format!("{}/{}/", self.base_url, name))
            .await?;
        let files: Vec<String> = anchor_texts(&body)
            .into_iter()
            .filter(|f| is_wheel(f))
            .collect();

        debug!(source = %self.source, package = name, wheels = files.len(), "Fetched listing");
        Ok(Some(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;

    const CATALOG_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<a href="/beeware/simple/numpy/">numpy</a>
<a href="/beeware/simple/pillow/">Pillow</a>
<a href="/beeware/simple/ruamel-yaml/">ruamel.yaml</a>
</body></html>"#;

    const NUMPY_HTML: &str = r#"<html><body>
<a href="numpy-2.1.0-cp313-cp313-ios_13_0_arm64_iphoneos.whl#sha256=aa">numpy-2.1.0-cp313-cp313-ios_13_0_arm64_iphoneos.whl</a>
<a href="numpy-2.1.0.tar.gz">numpy-2.1.0.tar.gz</a>
<A HREF="numpy-2.0.0-cp312-cp312-android_21_arm64_v8a.whl">
  numpy-2.0.0-cp312-cp312-android_21_arm64_v8a.whl
</A>
</body></html>"#;

    #[test]
    fn test_anchor_texts() {
        let texts = anchor_texts(NUMPY_HTML);
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1], "numpy-2.1.0.tar.gz");
        assert_eq!(texts[2], "numpy-2.0.0-cp312-cp312-android_21_arm64_v8a.whl");
        assert!(anchor_texts("<p>no links</p>").is_empty());
    }

    #[tokio::test]
    async fn test_listing_filters_to_wheels() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/simple/");
            then.status(200).body(CATALOG_HTML);
        });
        let listing = server.mock(|when, then| {
            when.method(GET).path("/simple/numpy/");
            then.status(200).body(NUMPY_HTML);
        });

        let client = SimpleIndexClient::new(
            Client::new(),
            &server.url("/simple"),
            SourceIndex::SecondaryA,
        );
        let files = client.fetch_listing("numpy").await.unwrap().unwrap();

        listing.assert();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.ends_with(".whl")));
    }

    #[tokio::test]
    async fn test_catalog_miss_skips_listing_request() {
        let server = MockServer::start_async().await;
        let catalog = server.mock(|when, then| {
            when.method(GET).path("/simple/");
            then.status(200).body(CATALOG_HTML);
        });
        let listing = server.mock(|when, then| {
            when.method(GET).path("/simple/requests/");
            then.status(200).body("");
        });

        let client = SimpleIndexClient::new(
            Client::new(),
            &server.url("/simple/"),
            SourceIndex::SecondaryB,
        );

        assert!(client.fetch_listing("requests").await.unwrap().is_none());
        assert!(client.fetch_listing("django").await.unwrap().is_none());

        // Catalog is memoized and names were normalized on ingest.
        catalog.assert_hits(1);
        listing.assert_hits(0);
        let names = client.catalog().await.unwrap().unwrap();
        assert!(names.contains("ruamel-yaml"));
        assert!(names.contains("pillow"));
    }

    #[tokio::test]
    async fn test_listing_without_catalog_reports_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/simple/");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/simple/numpy/");
            then.status(200).body(NUMPY_HTML);
        });
        server.mock(|when, then| {
            when.method(GET).path("/simple/missing/");
            then.status(404);
        });

        let client = SimpleIndexClient::new(
            Client::new(),
            &server.url("/simple"),
            SourceIndex::SecondaryA,
        );

        let files = client.fetch_listing("numpy").await.unwrap().unwrap();
        assert_eq!(files.len(), 2);

        match client.fetch_listing("missing").await {
            Err(IndexError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_catalog_is_fetched_once_under_concurrency() {
        let server = MockServer::start_async().await;
        let catalog = server.mock(|when, then| {
            when.method(GET).path("/simple/");
            then.status(500).delay(Duration::from_millis(300));
        });
        let listing = server.mock(|when, then| {
            when.method(GET).path("/simple/numpy/");
            then.status(200).body(NUMPY_HTML);
        });

        let client = Arc::new(SimpleIndexClient::new(
            Client::new(),
            &server.url("/simple"),
            SourceIndex::SecondaryA,
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(async move { client.fetch_listing("numpy").await }));
        }
        for handle in handles {
            let files = handle.await.unwrap().unwrap().unwrap();
            assert_eq!(files.len(), 2);
        }

        catalog.assert_hits(1);
        listing.assert_hits(8);
        assert!(client.catalog().await.unwrap().is_none());
    }
}
