//! Turns per-frame nose detections into discrete flap events.
//!
//! The tracker keeps the last observed vertical center of the nose box and
//! fires a flap when the nose moved upward by more than [`FLAP_THRESHOLD`]
//! pixels between two consecutive detections. Frames without a detection
//! leave the stored value untouched, so a briefly lost nose does not produce
//! a spurious flap when it reappears near its old position.

use log::debug;

/// Minimum upward displacement, in camera pixels, that counts as a flap.
pub const FLAP_THRESHOLD: i32 = 15;

#[derive(Debug, Default)]
pub struct FlapDetector {
    prev_y: Option<i32>,
}

impl FlapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's nose center y, if the detector found one. Returns
    /// whether a flap fired. The first detection only seeds the tracker.
    pub fn observe(&mut self, nose_y: Option<i32>) -> bool {
        let Some(y) = nose_y else {
            return false;
        };
        let flap = match self.prev_y {
            Some(prev) => {
                let diff = prev - y;
                debug!("nose y moved {diff}");
                diff > FLAP_THRESHOLD
            }
            None => false,
        };
        self.prev_y = Some(y);
        flap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_detection_never_flaps() {
        let mut tracker = FlapDetector::new();
        assert!(!tracker.observe(Some(0)));
    }

    #[test]
    fn upward_motion_past_threshold_flaps() {
        let mut tracker = FlapDetector::new();
        tracker.observe(Some(200));
        assert!(tracker.observe(Some(200 - FLAP_THRESHOLD - 1)));
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut tracker = FlapDetector::new();
        tracker.observe(Some(200));
        assert!(!tracker.observe(Some(200 - FLAP_THRESHOLD)));
    }

    #[test]
    fn downward_motion_never_flaps() {
        let mut tracker = FlapDetector::new();
        tracker.observe(Some(200));
        assert!(!tracker.observe(Some(260)));
    }

    #[test]
    fn missed_frames_keep_the_stale_value() {
        let mut tracker = FlapDetector::new();
        tracker.observe(Some(200));
        assert!(!tracker.observe(None));
        assert!(!tracker.observe(None));
        // Still compared against 200, not reseeded.
        assert!(tracker.observe(Some(180)));
    }

    #[test]
    fn prior_updates_whether_or_not_a_flap_fires() {
        let mut tracker = FlapDetector::new();
        tracker.observe(Some(200));
        assert!(tracker.observe(Some(150))); // 50 up: flap
        assert!(!tracker.observe(Some(140))); // only 10 more: no flap
    }

    #[test]
    fn flap_rule_over_a_sequence() {
        let values = [240, 238, 220, 250, 251, 200, 199];
        let mut tracker = FlapDetector::new();
        let fired: Vec<bool> = values.iter().map(|&v| tracker.observe(Some(v))).collect();
        let expected: Vec<bool> = std::iter::once(false)
            .chain(values.windows(2).map(|w| w[0] - w[1] > FLAP_THRESHOLD))
            .collect();
        assert_eq!(fired, expected);
    }
}
