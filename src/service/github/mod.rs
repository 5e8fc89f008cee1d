pub mod rest;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, StaleReport};

// Traits.

/// Generic stale pull request classifier trait that clients must implement.
///
/// Implementations own whatever credential they need to reach the code host.
#[async_trait]
pub trait GenericStaleClassifier: Send + Sync + 'static {
    /// Retrieve the stale pull requests of each repository.
    ///
    /// A pull request is stale when it has not been updated for at least `stale_hours`.
    /// The report has one entry per repository, in the order given, even when a
    /// repository has no stale pull requests.
    async fn retrieve(&self, repos: &[String], stale_hours: u64) -> Res<StaleReport>;
}

// Structs.

/// Stale pull request classifier for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StaleClient {
    inner: Arc<dyn GenericStaleClassifier>,
}

impl Deref for StaleClient {
    type Target = dyn GenericStaleClassifier;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl StaleClient {
    pub fn new(inner: Arc<dyn GenericStaleClassifier>) -> Self {
        Self { inner }
    }
}
