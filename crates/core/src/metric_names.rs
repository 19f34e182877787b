//! Well-known scalar tag constants written by the Gaussian-splatting trainer.
//!
//! These must match the tags the trainer passes to its summary writer
//! (`training_report` in `train.py`).

/// Total training loss over the sampled patches.
pub const TRAIN_TOTAL_LOSS: &str = "train_loss_patches/total_loss";

/// L1 photometric training loss.
pub const TRAIN_L1_LOSS: &str = "train_loss_patches/l1_loss";

/// L1 loss on the training-view evaluation pass.
pub const VALIDATION_L1_LOSS: &str = "train/loss_viewpoint - l1_loss";

/// PSNR on the training-view evaluation pass.
pub const VALIDATION_PSNR: &str = "train/loss_viewpoint - psnr";

/// PSNR on the held-out test views.
pub const TEST_PSNR: &str = "test/loss_viewpoint - psnr";

/// Number of Gaussians in the model.
pub const TOTAL_POINTS: &str = "total_points";

/// A metric the comparator summarises and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparedMetric {
    pub tag: &'static str,
    /// Chart panel title.
    pub title: &'static str,
    /// Chart y-axis label.
    pub y_label: &'static str,
}

/// Metrics compared between the weak and strong runs, in report order.
pub const COMPARED_METRICS: [ComparedMetric; 5] = [
    ComparedMetric {
        tag: TRAIN_TOTAL_LOSS,
        title: "Total Training Loss",
        y_label: "Loss",
    },
    ComparedMetric {
        tag: TRAIN_L1_LOSS,
        title: "L1 Training Loss",
        y_label: "L1 Loss",
    },
    ComparedMetric {
        tag: VALIDATION_L1_LOSS,
        title: "Validation L1 Loss",
        y_label: "L1 Loss",
    },
    ComparedMetric {
        tag: VALIDATION_PSNR,
        title: "Validation PSNR",
        y_label: "PSNR (dB)",
    },
    ComparedMetric {
        tag: TOTAL_POINTS,
        title: "Total Gaussians",
        y_label: "Count",
    },
];

/// Tags shown by the live monitor.
pub const MONITORED_TAGS: [&str; 4] = [TRAIN_TOTAL_LOSS, TRAIN_L1_LOSS, TEST_PSNR, TOTAL_POINTS];

/// Short label for a tag in monitor output.
pub fn display_name(tag: &str) -> String {
    tag.replace("train_loss_patches/", "")
        .replace("test/loss_viewpoint - ", "Test ")
}

/// PSNR improves upward; every other tracked metric improves downward.
pub fn higher_is_better(tag: &str) -> bool {
    tag.contains("psnr")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_known_prefixes() {
        assert_eq!(display_name("train_loss_patches/total_loss"), "total_loss");
        assert_eq!(display_name("test/loss_viewpoint - psnr"), "Test psnr");
        assert_eq!(display_name("total_points"), "total_points");
    }

    #[test]
    fn only_psnr_is_higher_is_better() {
        assert!(higher_is_better(VALIDATION_PSNR));
        assert!(higher_is_better(TEST_PSNR));
        assert!(!higher_is_better(TRAIN_L1_LOSS));
        assert!(!higher_is_better(TOTAL_POINTS));
    }

    #[test]
    fn compared_tags_are_unique() {
        let mut tags: Vec<_> = COMPARED_METRICS.iter().map(|m| m.tag).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), COMPARED_METRICS.len());
    }
}
