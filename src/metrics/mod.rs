use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by the skin runtime.
#[derive(Debug, Default, Clone)]
pub struct SkinMetrics {
    reloads: u64,
    reload_failures: u64,
    refits: u64,
    frames: u64,
    elements_drawn: u64,
}

impl SkinMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reload(&mut self) {
        self.reloads = self.reloads.saturating_add(1);
    }

    pub fn record_reload_failure(&mut self) {
        self.reload_failures = self.reload_failures.saturating_add(1);
    }

    pub fn record_refit(&mut self) {
        self.refits = self.refits.saturating_add(1);
    }

    pub fn record_frame(&mut self, elements: usize) {
        self.frames = self.frames.saturating_add(1);
        self.elements_drawn = self.elements_drawn.saturating_add(elements as u64);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            reloads: self.reloads,
            reload_failures: self.reload_failures,
            refits: self.refits,
            frames: self.frames,
            elements_drawn: self.elements_drawn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub reloads: u64,
    pub reload_failures: u64,
    pub refits: u64,
    pub frames: u64,
    pub elements_drawn: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut fields = LogFields::new();
        fields.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        fields.insert("reloads".to_string(), json!(self.reloads));
        fields.insert(
            "reload_failures".to_string(),
            json!(self.reload_failures),
        );
        fields.insert("refits".to_string(), json!(self.refits));
        fields.insert("frames".to_string(), json!(self.frames));
        fields.insert(
            "elements_drawn".to_string(),
            json!(self.elements_drawn),
        );
        LogEvent::with_fields(LogLevel::Info, target, "skin_metrics", fields)
    }
}
