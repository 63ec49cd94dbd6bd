use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cross-thread change notifications.
///
/// Watcher and resize callbacks may run anywhere; they only raise a flag
/// here. The tick thread consumes each flag at most once per tick, so a
/// burst of notifications collapses into a single reload or re-fit.
#[derive(Debug, Clone, Default)]
pub struct ReloadSignals {
    inner: Arc<Flags>,
}

#[derive(Debug, Default)]
struct Flags {
    document_changed: AtomicBool,
    surface_resized: AtomicBool,
}

impl ReloadSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// The definition document changed on disk.
    pub fn notify_document_changed(&self) {
        self.inner.document_changed.store(true, Ordering::Release);
    }

    /// The output surface changed size.
    pub fn notify_surface_resized(&self) {
        self.inner.surface_resized.store(true, Ordering::Release);
    }

    pub(crate) fn take_document_changed(&self) -> bool {
        self.inner.document_changed.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_surface_resized(&self) -> bool {
        self.inner.surface_resized.swap(false, Ordering::AcqRel)
    }
}
