use criterion::{Criterion, black_box, criterion_group, criterion_main};

use veneer::logging::{LogEvent, LogSink};
use veneer::runtime::DocumentSource;
use veneer::{
    Document, HeadlessBackend, Logger, LoggingResult, Result, RuntimeEvent, Size, SkinRuntime,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const WIDE: &str = "\
[Init]
BGColor = #101010

[Sizes]
compact=1280;720

[Sprites]
background=image
title=text
status=text
badge0=image
badge1=image
badge2=image
badge3=image

[background]
MaxSize = 1;1;1

[title]
Position = 0.5;0.1;0
MaxSize = 0.8;0.15;1
Text = Skin Bench

[status]
Position = 0.5;0.95;0
MaxSize = 0.6;0.08;1

[badge0]
Position = 0.1;0.5;0
MaxSize = 0.15;0.15;1
Alignment = TopLeft

[badge1]
Position = 0.35;0.5;0
MaxSize = 0.15;0.15;1

[badge2]
Position = 0.6;0.5;0
MaxSize = 0.15;0.15;1

[badge3]
Position = 0.85;0.5;0
MaxSize = 0.15;0.15;1
Alignment = BottomRight

[title@compact]
MaxSize = 1;0.2;1

[badge3@compact]
Visible = false
";

const NARROW: &str = "\
[Sprites]
background=image
title=text

[title]
Text = Minimal
";

/// Alternates between two documents so every reload really rebuilds.
struct AlternatingSource {
    docs: [&'static str; 2],
    next: usize,
}

impl AlternatingSource {
    fn new() -> Self {
        Self {
            docs: [WIDE, NARROW],
            next: 0,
        }
    }
}

impl DocumentSource for AlternatingSource {
    fn describe(&self) -> String {
        "bench".to_string()
    }

    fn load(&mut self) -> Result<Document> {
        let doc = Document::parse(self.docs[self.next])?;
        self.next = 1 - self.next;
        Ok(doc)
    }
}

fn build_runtime() -> SkinRuntime<HeadlessBackend> {
    let backend = HeadlessBackend::new(Size::new(1920, 1080));
    let mut runtime = SkinRuntime::new(backend, AlternatingSource::new());
    runtime.config_mut().logger = Some(Logger::new(NullSink));
    runtime.config_mut().enable_metrics();
    runtime
}

fn scripted_events() -> Vec<RuntimeEvent> {
    vec![
        RuntimeEvent::Tick,
        RuntimeEvent::DocumentChanged,
        RuntimeEvent::Tick,
        RuntimeEvent::Tick,
        RuntimeEvent::DocumentChanged,
        RuntimeEvent::Tick,
        RuntimeEvent::Tick,
    ]
}

fn reload_script(c: &mut Criterion) {
    let script = scripted_events();
    c.bench_function("reload_script", |b| {
        b.iter(|| {
            let mut runtime = build_runtime();
            runtime
                .run_scripted(black_box(script.clone()))
                .expect("scripted run");
        });
    });
}

fn resize_refit(c: &mut Criterion) {
    let resolutions = [
        Size::new(640, 480),
        Size::new(1280, 720),
        Size::new(1920, 1080),
        Size::new(800, 600),
    ];
    c.bench_function("resize_refit", |b| {
        b.iter(|| {
            let mut runtime = build_runtime();
            runtime.bootstrap().expect("bootstrap");
            for resolution in resolutions {
                runtime.backend_mut().set_resolution(black_box(resolution));
                runtime.signals().notify_surface_resized();
                runtime.tick().expect("tick");
            }
        });
    });
}

criterion_group!(benches, reload_script, resize_refit);
criterion_main!(benches);
