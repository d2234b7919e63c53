use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use fakefinder_core::model::{Catalog, CatalogReport};
use storage::CatalogSource;

use crate::error::CatalogLoadError;

/// Why the built-in catalog is in use instead of the configured one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogNotice {
    pub reason: String,
}

impl fmt::Display for CatalogNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insufficient image data ({}); using built-in pairs", self.reason)
    }
}

/// Result of a catalog load. Always usable: failures resolve to the fallback catalog.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Arc<Catalog>,
    /// Set when the fallback catalog replaced the configured one.
    pub notice: Option<CatalogNotice>,
    /// Records dropped during validation.
    pub skipped: usize,
}

impl LoadedCatalog {
    #[must_use]
    pub fn new(catalog: Catalog, report: &CatalogReport) -> Self {
        Self {
            catalog: Arc::new(catalog),
            notice: None,
            skipped: report.skipped.len(),
        }
    }

    #[must_use]
    pub fn fallback(reason: &CatalogLoadError) -> Self {
        Self {
            catalog: Arc::new(Catalog::fallback()),
            notice: Some(CatalogNotice {
                reason: reason.to_string(),
            }),
            skipped: 0,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}

/// Load and validate a catalog from `source`.
///
/// Never fails: a missing, unreadable or empty catalog is logged and replaced by
/// `Catalog::fallback()`.
pub async fn load_catalog(source: &dyn CatalogSource) -> LoadedCatalog {
    match try_load(source).await {
        Ok((catalog, report)) => {
            if !report.is_clean() {
                tracing::warn!(
                    skipped = report.skipped.len(),
                    "catalog contained invalid records; they were skipped"
                );
                for record in &report.skipped {
                    tracing::debug!(index = record.index, error = %record.error, "skipped record");
                }
            }
            tracing::info!(pairs = catalog.len(), "catalog loaded");
            LoadedCatalog::new(catalog, &report)
        }
        Err(err) => {
            tracing::warn!(error = %err, "catalog unavailable; falling back to built-in pairs");
            LoadedCatalog::fallback(&err)
        }
    }
}

async fn try_load(source: &dyn CatalogSource) -> Result<(Catalog, CatalogReport), CatalogLoadError> {
    let drafts = source.load_pairs().await?;
    Ok(Catalog::from_drafts(drafts)?)
}

//
// ─── READINESS ─────────────────────────────────────────────────────────────────
//

/// Awaitable view of a catalog that may still be loading.
///
/// Cloning is cheap; every clone observes the same load.
#[derive(Clone)]
pub struct CatalogHandle {
    rx: watch::Receiver<Option<LoadedCatalog>>,
}

/// Write side of `CatalogHandle::pending`.
pub struct CatalogPublisher {
    tx: watch::Sender<Option<LoadedCatalog>>,
}

impl CatalogPublisher {
    /// Resolve every handle attached to this publisher.
    pub fn publish(self, loaded: LoadedCatalog) {
        self.tx.send_replace(Some(loaded));
    }
}

impl CatalogHandle {
    /// Load `source` on a background task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(source: Arc<dyn CatalogSource>) -> Self {
        let (publisher, handle) = Self::pending();
        tokio::spawn(async move {
            let loaded = load_catalog(source.as_ref()).await;
            publisher.publish(loaded);
        });
        handle
    }

    /// An unresolved handle plus the publisher that resolves it.
    #[must_use]
    pub fn pending() -> (CatalogPublisher, Self) {
        let (tx, rx) = watch::channel(None);
        (CatalogPublisher { tx }, Self { rx })
    }

    /// A handle that is already resolved.
    #[must_use]
    pub fn ready(loaded: LoadedCatalog) -> Self {
        let (_tx, rx) = watch::channel(Some(loaded));
        Self { rx }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// The loaded catalog, or `None` while the load is in flight.
    ///
    /// A loader that went away without publishing counts as resolved to the fallback.
    #[must_use]
    pub fn current(&self) -> Option<LoadedCatalog> {
        // A publisher sends before it drops, so read the value after checking closed.
        let closed = self.rx.has_changed().is_err();
        if let Some(loaded) = self.rx.borrow().as_ref() {
            return Some(loaded.clone());
        }
        closed.then(|| LoadedCatalog::fallback(&CatalogLoadError::LoaderGone))
    }

    /// Wait until the catalog is resolved.
    pub async fn wait(&self) -> LoadedCatalog {
        let mut rx = self.rx.clone();
        let resolved = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.as_ref().cloned(),
            Err(_) => None,
        };
        resolved.unwrap_or_else(|| {
            tracing::warn!("catalog loader stopped before publishing; using built-in pairs");
            LoadedCatalog::fallback(&CatalogLoadError::LoaderGone)
        })
    }
}

impl fmt::Debug for CatalogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogHandle")
            .field("ready", &self.rx.borrow().is_some())
            .finish_non_exhaustive()
    }
}
