//! Basic evaluation example demonstrating core functionality.

use coco_match::metrics::iou::{calculate_crowd_iou, calculate_iou};
use coco_match::{evaluate, load_from_string, BoundingBox, EvalConfig, MemoryStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Detection Matching Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 50.0, 50.0);
    println!("   IoU between overlapping boxes: {:.4}", calculate_iou(&bbox1, &bbox2));

    let region = BoundingBox::new(0.0, 0.0, 200.0, 200.0);
    println!("   Overlap with a crowd region: {:.4}", calculate_crowd_iou(&bbox1, &region));
    println!();

    // Example 2: Load samples
    println!("2. Loading Samples");
    let samples_json = r#"{
        "samples": [
            {
                "id": 1,
                "filepath": "images/street.jpg",
                "fields": {
                    "predictions": {
                        "detections": [
                            {"id": 1, "label": "person", "bounding_box": [105.0, 98.0, 195.0, 155.0], "confidence": 0.95},
                            {"id": 2, "label": "car", "bounding_box": [348.0, 198.0, 105.0, 125.0], "confidence": 0.87},
                            {"id": 3, "label": "car", "bounding_box": [10.0, 10.0, 40.0, 40.0], "confidence": 0.30}
                        ]
                    },
                    "ground_truth": {
                        "detections": [
                            {"id": 1, "label": "person", "bounding_box": [100.0, 100.0, 200.0, 150.0]},
                            {"id": 2, "label": "car", "bounding_box": [350.0, 200.0, 100.0, 120.0]},
                            {"id": 3, "label": "person", "bounding_box": [500.0, 50.0, 120.0, 300.0],
                             "attributes": {"iscrowd": 1}}
                        ]
                    }
                }
            }
        ]
    }"#;

    let dataset = load_from_string(samples_json)?;
    println!("   Loaded {} samples", dataset.samples.len());
    println!();

    // Example 3: Evaluate
    println!("3. Matching Detections");
    let config = EvalConfig::default().with_iou_thresholds(vec![0.5, 0.75, 0.9]);
    let mut store = MemoryStore::new();
    let stats = evaluate(&dataset.samples, config, &mut store)?;

    for evaluation in store.evaluations() {
        println!("   Sample {} ({}):", evaluation.sample_id, evaluation.eval_key);
        for threshold in evaluation.counts.true_positives.thresholds() {
            let Some(counts) = evaluation.counts.at(threshold) else {
                continue;
            };
            println!(
                "     IoU {:.2}: TP={} FP={} FN={}",
                threshold, counts.true_positives, counts.false_positives, counts.false_negatives
            );
        }

        for pred in &evaluation.predictions {
            match pred.matches.get(0.75).copied().flatten() {
                Some(pair) => println!(
                    "     {} #{} matched {} (IoU {:.3})",
                    pred.label, pred.detection_id, pair.gt_eval_id, pair.iou
                ),
                None => println!("     {} #{} unmatched at 0.75", pred.label, pred.detection_id),
            }
        }
    }
    println!();

    // Example 4: Serialized record
    println!("4. Serialized Record");
    let json = serde_json::to_string_pretty(&store.evaluations()[0].counts)?;
    println!("{}", json);

    stats.print_summary();
    Ok(())
}
