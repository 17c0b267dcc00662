//! Intersection over Union (IoU) calculation.

use crate::types::BoundingBox;

/// Area of the intersection of two boxes, 0.0 when they do not overlap.
fn intersection_area(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let x_left = bbox1.x.max(bbox2.x);
    let y_top = bbox1.y.max(bbox2.y);
    let x_right = bbox1.right().min(bbox2.right());
    let y_bottom = bbox1.bottom().min(bbox2.bottom());

    if x_right < x_left || y_bottom < y_top {
        return 0.0;
    }

    (x_right - x_left) * (y_bottom - y_top)
}

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Example
///
/// ```
/// use coco_match::metrics::iou::calculate_iou;
/// use coco_match::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let bbox2 = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let intersection_area = intersection_area(bbox1, bbox2);
    let union_area = bbox1.area() + bbox2.area() - intersection_area;

    // Avoid division by zero
    if union_area == 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Calculate the overlap of a prediction with a crowd region.
///
/// A crowd region may cover many objects, so the intersection is divided by
/// the prediction's own area instead of the union.
///
/// # Example
///
/// ```
/// use coco_match::metrics::iou::calculate_crowd_iou;
/// use coco_match::types::BoundingBox;
///
/// let crowd = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
/// let pred = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
/// assert_eq!(calculate_crowd_iou(&pred, &crowd), 1.0);
/// ```
pub fn calculate_crowd_iou(prediction: &BoundingBox, crowd: &BoundingBox) -> f64 {
    let prediction_area = prediction.area();
    if prediction_area == 0.0 {
        return 0.0;
    }

    intersection_area(prediction, crowd) / prediction_area
}

/// Calculate the overlap matrix between predictions and ground truths.
///
/// # Arguments
///
/// * `predictions` - Prediction boxes, one row each
/// * `ground_truths` - Ground truth boxes, one column each
/// * `iscrowd` - Per ground truth crowd flag; crowd columns use [`calculate_crowd_iou`]
///
/// # Returns
///
/// Returns a 2D vector where `result[i][j]` is the overlap between
/// `predictions[i]` and `ground_truths[j]`. With no ground truths every row is
/// empty; with no predictions the matrix has no rows.
///
/// # Example
///
/// ```
/// use coco_match::metrics::iou::calculate_iou_matrix;
/// use coco_match::types::BoundingBox;
///
/// let preds = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let gts = vec![BoundingBox::new(5.0, 5.0, 10.0, 10.0)];
/// let matrix = calculate_iou_matrix(&preds, &gts, &[false]);
/// assert_eq!(matrix.len(), 1);
/// assert_eq!(matrix[0].len(), 1);
///
/// let empty = calculate_iou_matrix(&preds, &[], &[]);
/// assert_eq!(empty, vec![Vec::<f64>::new()]);
/// ```
pub fn calculate_iou_matrix(
    predictions: &[BoundingBox],
    ground_truths: &[BoundingBox],
    iscrowd: &[bool],
) -> Vec<Vec<f64>> {
    debug_assert_eq!(ground_truths.len(), iscrowd.len());

    predictions
        .iter()
        .map(|pred| {
            ground_truths
                .iter()
                .enumerate()
                .map(|(j, gt)| {
                    if iscrowd.get(j).copied().unwrap_or(false) {
                        calculate_crowd_iou(pred, gt)
                    } else {
                        calculate_iou(pred, gt)
                    }
                })
                .collect()
        })
        .collect()
}
