//! Benchmarks for the layerport pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use layerport::classify;
use layerport::export::{export, ExportOptions};
use layerport::package::{MemoryDirectory, SequentialIds};
use layerport::render::nine_slice::reduce;
use layerport::types::{
    Border, BorderOrder, Colour, Document, Effect, LayerKind, LayerNode, NamingRules, Rect, Shadow,
    Stroke, StrokePosition,
};
use layerport::{EffectBaker, ExportConfig};

fn disc(size: u32) -> RgbaImage {
    let r = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        if dx * dx + dy * dy <= r * r {
            Rgba([200, 80, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn stroked(size: u32) -> LayerNode {
    let mut layer = LayerNode::new(1, "badge", LayerKind::Image, Rect::from_xywh(0, 0, size as i32, size as i32))
        .with_bitmap(disc(size));
    layer.effects = vec![
        Effect::Stroke(Stroke {
            size: 3.0,
            position: StrokePosition::Outside,
            color: Colour::BLACK,
            opacity: 1.0,
            enabled: true,
        }),
        Effect::DropShadow(Shadow {
            color: Colour::BLACK,
            opacity: 0.6,
            angle: 90.0,
            distance: 4.0,
            size: 6.0,
            enabled: true,
        }),
    ];
    layer
}

// -- Classification --

fn bench_classify(c: &mut Criterion) {
    let rules = NamingRules::default();
    let names = [
        "bg",
        "common_Btn$start game",
        "panel@9#100,40_4,6,8,2",
        "avatar@loader",
        "guides@skip",
    ];

    c.bench_function("classify_names", |b| {
        b.iter(|| {
            for name in names {
                black_box(classify(
                    black_box(name),
                    LayerKind::Image,
                    &rules,
                    BorderOrder::TopRightBottomLeft,
                ));
            }
        })
    });
}

// -- Rasters --

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    let small = stroked(32);
    let large = stroked(256);
    let mut baker = EffectBaker::new();

    group.bench_function("bake_effects_32", |b| b.iter(|| baker.bake(black_box(&small))));
    group.bench_function("bake_effects_256", |b| b.iter(|| baker.bake(black_box(&large))));

    let stretched = disc(400);
    let border = Border::new(20, 20, 20, 20);
    group.bench_function("nine_slice_reduce", |b| {
        b.iter(|| reduce(black_box(&stretched), 60, 60, border))
    });

    group.finish();
}

// -- Full export --

fn bench_export(c: &mut Criterion) {
    let mut document = Document::new("Main", 800, 600);
    document.layers = (0..40)
        .map(|i| {
            let x = (i % 8) * 90;
            let y = (i / 8) * 90;
            LayerNode::new(i as u32, format!("icon {}", i), LayerKind::Image, Rect::from_xywh(x, y, 64, 64))
                .with_bitmap(disc(64))
        })
        .collect();
    let config = ExportConfig::default();

    c.bench_function("export_fairygui_40_layers", |b| {
        b.iter(|| {
            let mut dir = MemoryDirectory::new();
            let mut ids = SequentialIds::new();
            export(&document, &config, &mut dir, &mut ids, ExportOptions::default()).unwrap()
        })
    });
}

criterion_group!(benches, bench_classify, bench_rendering, bench_export);
criterion_main!(benches);
