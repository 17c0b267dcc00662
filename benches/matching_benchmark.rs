use coco_match::config::EvalConfig;
use coco_match::evaluator::SampleEvaluator;
use coco_match::metrics::{calculate_iou, calculate_iou_matrix};
use coco_match::types::{AttributeValue, BoundingBox, Detection, Sample};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_iou_calculation(c: &mut Criterion) {
    let bbox1 = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 50.0, 50.0);

    c.bench_function("iou_single", |b| {
        b.iter(|| calculate_iou(black_box(&bbox1), black_box(&bbox2)));
    });
}

fn bench_iou_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("iou_matrix");

    for size in [10, 50, 100, 500].iter() {
        let boxes: Vec<BoundingBox> = (0..*size)
            .map(|i| {
                let offset = (i as f64) * 2.0;
                BoundingBox::new(offset, offset, 50.0, 50.0)
            })
            .collect();
        let iscrowd: Vec<bool> = (0..*size).map(|i| i % 10 == 0).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| calculate_iou_matrix(black_box(&boxes), black_box(&boxes), &iscrowd));
        });
    }
    group.finish();
}

fn dense_sample(num_detections: usize, num_labels: usize) -> Sample {
    let mut preds = Vec::with_capacity(num_detections);
    let mut gts = Vec::with_capacity(num_detections);

    for i in 0..num_detections {
        let label = format!("class_{}", i % num_labels);
        let offset = (i as f64) * 5.0;
        gts.push(
            Detection::new(i as u64, label.clone(), vec![offset, offset, 40.0, 40.0])
                .with_attribute("iscrowd", AttributeValue::Int((i % 25 == 0) as i64)),
        );
        preds.push(
            Detection::new(i as u64, label, vec![offset + 2.0, offset + 1.0, 40.0, 40.0])
                .with_confidence(((i * 37) % 100) as f64 / 100.0),
        );
    }

    Sample::new(1)
        .with_field("predictions", preds)
        .with_field("ground_truth", gts)
}

fn bench_evaluate_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_sample");
    let evaluator = SampleEvaluator::new(EvalConfig::default()).unwrap();

    for size in [10, 100, 500, 1000].iter() {
        let sample = dense_sample(*size, 5);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| evaluator.evaluate_sample(black_box(&sample)).unwrap());
        });
    }
    group.finish();
}

fn bench_threshold_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold_sweep");
    let sample = dense_sample(200, 5);

    for steps in [1, 10, 50].iter() {
        let thresholds = coco_match::generate_threshold_range(0.5, 0.95, *steps).unwrap();
        let evaluator =
            SampleEvaluator::new(EvalConfig::default().with_iou_thresholds(thresholds)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(steps), steps, |b, _| {
            b.iter(|| evaluator.evaluate_sample(black_box(&sample)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_iou_calculation,
    bench_iou_matrix,
    bench_evaluate_sample,
    bench_threshold_sweep
);
criterion_main!(benches);
