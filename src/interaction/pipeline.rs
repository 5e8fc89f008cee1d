//! The fetch-or-cache, format, then send pipeline shared by every trigger.

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        report::{FormatOptions, format_report},
        types::{Res, StaleReport, Void},
    },
    service::{cache::ResultCache, github::StaleClient},
};

/// Cache key of the current stale pull request report.
pub const STALE_REPORT_CACHE_KEY: &str = "stale-prs";

/// Delivery pipeline for stale pull request reports.
///
/// It is designed to be trivially cloneable; clones share the same cache.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    classifier: StaleClient,
    cache: ResultCache<Arc<StaleReport>>,
    repos: Vec<String>,
    stale_hours: u64,
    format: FormatOptions,
}

impl Pipeline {
    /// Creates a pipeline with an explicit cache.
    pub fn new(classifier: StaleClient, cache: ResultCache<Arc<StaleReport>>, repos: Vec<String>, stale_hours: u64, format: FormatOptions) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                classifier,
                cache,
                repos,
                stale_hours,
                format,
            }),
        }
    }

    /// Creates a pipeline with the repositories, threshold, and cache TTL from `config`.
    pub fn from_config(config: &Config, classifier: StaleClient) -> Self {
        let format = FormatOptions {
            skip_empty_repos: config.skip_empty_repos,
        };

        Self::new(
            classifier,
            ResultCache::new(Duration::from_secs(config.cache_ttl_secs)),
            config.repos.clone(),
            config.stale_hours,
            format,
        )
    }

    /// Gets the current report, from the cache when still fresh.
    #[instrument(skip_all)]
    pub async fn report(&self) -> Res<Arc<StaleReport>> {
        let inner = &self.inner;

        inner
            .cache
            .get_or_fetch(STALE_REPORT_CACHE_KEY, move || async move {
                info!("Retrieving stale pull requests for {} repositories ...", inner.repos.len());
                let report = inner.classifier.retrieve(&inner.repos, inner.stale_hours).await?;
                Res::Ok(Arc::new(report))
            })
            .await
    }

    /// Renders a report with this pipeline's format options.
    pub fn render(&self, report: &StaleReport) -> String {
        format_report(report, self.inner.format)
    }

    /// Gets the current report, formats it, and hands the text to `send`.
    ///
    /// If the report cannot be retrieved, `send` is never called and the error is returned.
    pub async fn deliver<S, Fut>(&self, send: S) -> Void
    where
        S: FnOnce(String) -> Fut,
        Fut: Future<Output = Void>,
    {
        let report = self.report().await?;
        let text = self.render(&report);

        send(text).await
    }
}
