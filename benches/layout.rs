use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use dashgrid::logging::{LogEvent, LogSink};
use dashgrid::{
    DashboardLayout, DisplayMode, EngineConfig, GestureMode, GridEngine, GridMetrics,
    GridPosition, Logger, LoggingResult, PointerEvent, PointerPoint, ProjectionCache, Widget,
    WidgetKind, ZoneArrangement, normalize, project,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const KINDS: [WidgetKind; 6] = [
    WidgetKind::State,
    WidgetKind::Camera,
    WidgetKind::Energy,
    WidgetKind::Solar,
    WidgetKind::Grafana,
    WidgetKind::Weather,
];

/// Overlapping pile of widgets, the worst case for the resolver scan.
fn crowded_widgets(count: usize) -> Vec<Widget> {
    (0..count)
        .map(|index| {
            let kind = KINDS[index % KINDS.len()];
            let (w, h) = kind.template_size(9);
            let x = (index % 4) as f64 * 1.5;
            let y = (index / 4) as f64 * 0.5;
            Widget::new(format!("w-{index}"), kind, GridPosition::new(x, y, w, h))
        })
        .collect()
}

fn normalize_crowded(c: &mut Criterion) {
    let widgets = crowded_widgets(48);
    c.bench_function("normalize_crowded_48", |b| {
        b.iter(|| normalize(black_box(&widgets), 9));
    });
}

fn project_modes(c: &mut Criterion) {
    let widgets = normalize(&crowded_widgets(48), 18);
    let modes = [
        DisplayMode::Sectioned,
        DisplayMode::Compact,
        DisplayMode::Zoned(ZoneArrangement::SideBySide),
        DisplayMode::Zoned(ZoneArrangement::Stacked),
    ];
    c.bench_function("project_all_modes_48", |b| {
        b.iter(|| {
            for mode in modes {
                black_box(project(black_box(&widgets), 18, mode));
            }
        });
    });

    let mut cache = ProjectionCache::new(Duration::from_secs(60));
    c.bench_function("project_cached_48", |b| {
        b.iter(|| black_box(cache.project(&widgets, 18, DisplayMode::Sectioned)));
    });
}

fn drag_session(c: &mut Criterion) {
    let layout = DashboardLayout::default().with_widgets(normalize(&crowded_widgets(24), 9));
    let script: Vec<PointerEvent> = std::iter::once(PointerEvent::Down {
        widget_id: "w-1".into(),
        mode: GestureMode::Move,
        at: PointerPoint::new(0.0, 0.0),
    })
    .chain((1..=30).map(|step| PointerEvent::Move {
        at: PointerPoint::new(step as f64 * 12.0, step as f64 * 7.0),
    }))
    .chain(std::iter::once(PointerEvent::Up {
        at: PointerPoint::new(360.0, 210.0),
    }))
    .collect();

    c.bench_function("drag_session_scripted", |b| {
        b.iter(|| {
            let config = EngineConfig::default().with_logger(Logger::new(NullSink));
            let mut engine = GridEngine::new(layout.clone(), config);
            engine.set_grid_metrics(GridMetrics::new(90.0, 90.0, 10.0));
            for event in script.iter().cloned() {
                let _ = black_box(engine.handle_pointer(event));
            }
        });
    });
}

criterion_group!(benches, normalize_crowded, project_modes, drag_session);
criterion_main!(benches);
