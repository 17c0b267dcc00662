//! Per-sample evaluation orchestrator.

use crate::config::EvalConfig;
use crate::error::{CocoMatchError, Result};
use crate::matching::{build_overlaps, group_by_category, EvalIdAllocator, ThresholdMatcher};
use crate::results::{GroundTruthEval, PredictionEval, ResultAggregator, SampleEvaluation};
use crate::stats::EvaluationStats;
use crate::store::SampleStore;
use crate::threshold::{ThresholdMap, SUMMARY_IOU_THRESHOLD};
use crate::types::{BoundingBox, Detection, Detections, Sample};
use std::borrow::Borrow;

/// Evaluates samples one at a time with a fixed configuration.
pub struct SampleEvaluator {
    config: EvalConfig,
}

impl SampleEvaluator {
    /// Create an evaluator, validating and normalizing `config`.
    pub fn new(config: EvalConfig) -> Result<Self> {
        let config = config.validated()?;

        if !config
            .iou_thresholds
            .iter()
            .any(|&t| (t - SUMMARY_IOU_THRESHOLD).abs() < 1e-6)
        {
            log::warn!(
                "IoU {} is not in the threshold sweep, tp_iou75/fp_iou75/fn_iou75 will be absent",
                SUMMARY_IOU_THRESHOLD
            );
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Match the predictions of one sample to its ground truths.
    ///
    /// Every detection is validated before any matching starts, so a
    /// malformed detection fails the whole sample. The sample itself is not
    /// modified; evaluating it again yields identical results.
    ///
    /// # Errors
    ///
    /// * [`CocoMatchError::MissingField`] if either configured field is absent
    /// * [`CocoMatchError::MalformedDetection`] if a box or confidence is unusable
    pub fn evaluate_sample(&self, sample: &Sample) -> Result<SampleEvaluation> {
        let config = &self.config;
        let thresholds = config.iou_thresholds.as_slice();

        let preds = required_field(sample, &config.pred_field)?;
        let gts = required_field(sample, &config.gt_field)?;

        let pred_boxes = preds
            .detections
            .iter()
            .map(|det| validated_bbox(sample.id, &config.pred_field, det))
            .collect::<Result<Vec<_>>>()?;
        let pred_confidences = preds
            .detections
            .iter()
            .map(|det| validated_confidence(sample.id, &config.pred_field, det))
            .collect::<Result<Vec<_>>>()?;
        let gt_boxes = gts
            .detections
            .iter()
            .map(|det| validated_bbox(sample.id, &config.gt_field, det))
            .collect::<Result<Vec<_>>>()?;

        // Predictions take the lower ids, ground truths follow
        let mut eval_ids = EvalIdAllocator::new();
        let mut predictions: Vec<PredictionEval> = preds
            .detections
            .iter()
            .zip(pred_confidences)
            .map(|(det, confidence)| PredictionEval {
                detection_id: det.id,
                eval_id: eval_ids.allocate(),
                label: det.label.clone(),
                confidence,
                ious: None,
                matches: ThresholdMap::filled(thresholds, None),
            })
            .collect();
        let mut ground_truths: Vec<GroundTruthEval> = gts
            .detections
            .iter()
            .map(|det| GroundTruthEval {
                detection_id: det.id,
                eval_id: eval_ids.allocate(),
                label: det.label.clone(),
                iscrowd: det.is_crowd(&config.crowd_attribute),
                matches: ThresholdMap::filled(thresholds, None),
            })
            .collect();

        let mut buckets = group_by_category(&predictions, &ground_truths);
        for bucket in &mut buckets {
            build_overlaps(bucket, &mut predictions, &pred_boxes, &ground_truths, &gt_boxes);
        }

        let mut aggregator = ResultAggregator::new(thresholds, config.false_negative_scope);
        let category_ids: Vec<usize> = buckets
            .iter()
            .map(|b| aggregator.add_category(&b.label, b.predictions.len(), b.ground_truths.len()))
            .collect();

        let matcher = ThresholdMatcher::new(&ground_truths);
        for (threshold_idx, &threshold) in thresholds.iter().enumerate() {
            for (bucket, &category_idx) in buckets.iter().zip(&category_ids) {
                let counts = matcher.match_bucket(
                    bucket,
                    threshold_idx,
                    threshold,
                    &mut predictions,
                    &mut ground_truths,
                );
                aggregator.record(category_idx, threshold_idx, counts);
            }
        }

        let aggregated = aggregator.finish();
        let summary = aggregated.summary;

        log::debug!(
            "Sample {}: {} predictions, {} ground truths, {} categories",
            sample.id,
            predictions.len(),
            ground_truths.len(),
            buckets.len()
        );

        Ok(SampleEvaluation {
            sample_id: sample.id,
            eval_key: config.eval_key(),
            pred_field: config.pred_field.clone(),
            gt_field: config.gt_field.clone(),
            predictions,
            ground_truths,
            counts: aggregated.counts,
            categories: aggregated.categories,
            tp_iou75: summary.map(|c| c.true_positives),
            fp_iou75: summary.map(|c| c.false_positives),
            fn_iou75: summary.map(|c| c.false_negatives),
        })
    }

    /// Evaluate samples in order, persisting each before starting the next.
    ///
    /// The first failure stops the run and is returned. Samples saved
    /// before it stay committed in `store`.
    pub fn evaluate_samples<I, S>(&self, samples: I, store: &mut S) -> Result<EvaluationStats>
    where
        I: IntoIterator,
        I::Item: Borrow<Sample>,
        S: SampleStore + ?Sized,
    {
        let mut stats = EvaluationStats::new();

        log::info!(
            "Evaluating '{}' against '{}' at {} IoU thresholds",
            self.config.pred_field,
            self.config.gt_field,
            self.config.iou_thresholds.len()
        );

        for sample in samples {
            let sample: &Sample = sample.borrow();
            let evaluation = self
                .evaluate_sample(sample)
                .and_then(|evaluation| store.save(&evaluation).map(|()| evaluation));

            match evaluation {
                Ok(evaluation) => stats.record(&evaluation),
                Err(e) => {
                    log::error!(
                        "Evaluation stopped at sample {} after {} samples: {}",
                        sample.id,
                        stats.samples_evaluated,
                        e
                    );
                    return Err(e);
                }
            }
        }

        log::info!("{}", stats.summary_string());
        Ok(stats)
    }
}

/// Evaluate `samples` with `config`, saving each result to `store`.
///
/// # Example
///
/// ```
/// use coco_match::config::EvalConfig;
/// use coco_match::evaluator::evaluate;
/// use coco_match::store::MemoryStore;
/// use coco_match::types::{Detection, Sample};
///
/// let sample = Sample::new(1)
///     .with_field("predictions", vec![
///         Detection::new(1, "cat", vec![0.0, 0.0, 10.0, 10.0]).with_confidence(0.9),
///     ])
///     .with_field("ground_truth", vec![
///         Detection::new(1, "cat", vec![0.0, 0.0, 10.0, 10.0]),
///     ]);
///
/// let mut store = MemoryStore::new();
/// let stats = evaluate(vec![sample], EvalConfig::default(), &mut store).unwrap();
/// assert_eq!(stats.samples_evaluated, 1);
/// assert_eq!(store.evaluations()[0].tp_iou75, Some(1));
/// ```
pub fn evaluate<I, S>(samples: I, config: EvalConfig, store: &mut S) -> Result<EvaluationStats>
where
    I: IntoIterator,
    I::Item: Borrow<Sample>,
    S: SampleStore + ?Sized,
{
    SampleEvaluator::new(config)?.evaluate_samples(samples, store)
}

fn required_field<'a>(sample: &'a Sample, field: &str) -> Result<&'a Detections> {
    sample.field(field).ok_or_else(|| CocoMatchError::MissingField {
        sample_id: sample.id,
        field: field.to_string(),
    })
}

fn malformed(sample_id: u64, field: &str, det: &Detection, reason: impl Into<String>) -> CocoMatchError {
    CocoMatchError::MalformedDetection {
        sample_id,
        field: field.to_string(),
        detection_id: det.id,
        reason: reason.into(),
    }
}

fn validated_bbox(sample_id: u64, field: &str, det: &Detection) -> Result<BoundingBox> {
    let bbox = det.to_bbox().ok_or_else(|| {
        malformed(
            sample_id,
            field,
            det,
            format!("expected 4 bounding box values, got {}", det.bounding_box.len()),
        )
    })?;

    if !det.bounding_box.iter().all(|v| v.is_finite()) {
        return Err(malformed(sample_id, field, det, "bounding box has non-finite values"));
    }

    if bbox.width < 0.0 || bbox.height < 0.0 {
        return Err(malformed(sample_id, field, det, "bounding box has negative dimensions"));
    }

    Ok(bbox)
}

fn validated_confidence(sample_id: u64, field: &str, det: &Detection) -> Result<f64> {
    match det.confidence {
        Some(confidence) if confidence.is_finite() => Ok(confidence),
        Some(_) => Err(malformed(sample_id, field, det, "confidence is not finite")),
        None => Err(malformed(sample_id, field, det, "prediction has no confidence")),
    }
}
