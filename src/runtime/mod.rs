//! The reload controller: a tick loop that consumes change signals,
//! schedules reloads and re-fits, and produces one frame per tick.
//!
//! One logical tick thread owns the skin state and the backend. External
//! notifications only set flags through [`ReloadSignals`]; everything else
//! happens synchronously inside [`SkinRuntime::tick`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::error::{Result, SkinError};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::SkinMetrics;
use crate::render::RenderBackend;
use crate::skin::SkinState;

mod signals;
mod source;

pub use signals::ReloadSignals;
pub use source::{DocumentSource, FileSource};

/// Configuration knobs for the runtime loop.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Optional structured logger used by the runtime and the skin state.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<SkinMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "veneer::runtime.metrics".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(SkinMetrics::new())));
        }
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<SkinMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Events for scripted runs: what a host loop would feed the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    Tick,
    DocumentChanged,
    SurfaceResized,
}

/// Owns the backend, the skin state, and the document source, and turns
/// change signals into reloads and re-fits at tick boundaries.
pub struct SkinRuntime<B: RenderBackend> {
    backend: B,
    skin: SkinState,
    source: Box<dyn DocumentSource>,
    signals: ReloadSignals,
    config: RuntimeConfig,
    applied_hash: Option<blake3::Hash>,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl<B: RenderBackend> SkinRuntime<B> {
    pub fn new(backend: B, source: impl DocumentSource + 'static) -> Self {
        Self {
            backend,
            skin: SkinState::new(),
            source: Box::new(source),
            signals: ReloadSignals::new(),
            config: RuntimeConfig::default(),
            applied_hash: None,
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    /// Handle for watcher/resize callbacks on other threads.
    pub fn signals(&self) -> ReloadSignals {
        self.signals.clone()
    }

    pub fn skin(&self) -> &SkinState {
        &self.skin
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Push live text into a text element (frame counters and the like).
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.skin.set_text(name, text)
    }

    /// Initial load. Unlike tick-time reloads, a failure here is returned
    /// to the caller: there is no previous generation to fall back to.
    pub fn bootstrap(&mut self) -> Result<()> {
        self.skin.set_logger(self.config.logger.clone());
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log(
            LogLevel::Info,
            "runtime_started",
            [json_kv("source", json!(self.source.describe()))],
        );
        self.reload()
    }

    /// One pass of the owning loop: consume pending signals, then produce a
    /// frame. Signals raised while this runs are seen on the next tick.
    pub fn tick(&mut self) -> Result<()> {
        if self.signals.take_document_changed() {
            if let Err(err) = self.reload() {
                // A fatal alignment conflict propagates; anything else
                // keeps the previous generation alive.
                if matches!(err, SkinError::Alignment(_)) {
                    return Err(err);
                }
                self.record(SkinMetrics::record_reload_failure);
                self.log(
                    LogLevel::Warn,
                    "reload_failed",
                    [json_kv("error", json!(err.to_string()))],
                );
            }
        }
        if self.signals.take_surface_resized() {
            self.refit()?;
        }
        self.present_frame()?;
        self.maybe_emit_metrics();
        Ok(())
    }

    /// Drive the runtime from a fixed event script; used by tests, benches,
    /// and hosts that fake their own loop.
    pub fn run_scripted<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap()?;
        for event in events {
            match event {
                RuntimeEvent::DocumentChanged => self.signals.notify_document_changed(),
                RuntimeEvent::SurfaceResized => self.signals.notify_surface_resized(),
                RuntimeEvent::Tick => self.tick()?,
            }
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        let doc = self.source.load()?;
        let hash = doc.content_hash();
        if self.applied_hash == Some(hash) {
            self.log(
                LogLevel::Debug,
                "reload_skipped",
                [json_kv("reason", json!("content unchanged"))],
            );
            return Ok(());
        }
        self.skin.load_from_document(doc, &mut self.backend)?;
        self.applied_hash = Some(hash);
        self.record(SkinMetrics::record_reload);
        self.log(
            LogLevel::Info,
            "skin_loaded",
            [
                json_kv("elements", json!(self.skin.len())),
                json_kv("breakpoint", json!(self.skin.current_breakpoint())),
            ],
        );
        Ok(())
    }

    fn refit(&mut self) -> Result<()> {
        self.skin.refit(&mut self.backend)?;
        self.record(SkinMetrics::record_refit);
        let resolution = self.backend.resolution();
        self.log(
            LogLevel::Info,
            "skin_refitted",
            [
                json_kv("width", json!(resolution.width)),
                json_kv("height", json!(resolution.height)),
                json_kv("breakpoint", json!(self.skin.current_breakpoint())),
            ],
        );
        Ok(())
    }

    fn present_frame(&mut self) -> Result<()> {
        self.backend.clear(self.skin.background())?;
        let handles = self.skin.handles();
        let drawn = handles.len();
        self.backend.render(&handles)?;
        self.backend.present()?;
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_frame(drawn);
            }
        }
        Ok(())
    }

    fn record(&self, update: impl FnOnce(&mut SkinMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) {
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, "veneer::runtime", message, fields));
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() {
            return;
        }
        if self.config.metrics_interval.is_zero() {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => {
                return;
            }
            _ => {
                self.last_metrics_emit = Some(now);
            }
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let _ = logger.log_event(guard.snapshot(uptime).to_log_event(target));
            }
        }
    }
}
