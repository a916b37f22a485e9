//! The mutable state shared by the event mapper and the feedback renderer.

use crate::smooth_damp::SmoothDamp;

/// Per-session feedback state.
///
/// The event mapper writes the raw targets and the feedback flag; the
/// renderer writes the smoothed values. Both run on the frame thread (see
/// [`crate::session`]), so a frame never sees half of a prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackState {
    /// Latest raw decoder output for the left class. Not clamped.
    pub target_left: f32,
    /// Latest raw decoder output for the right class. Not clamped.
    pub target_right: f32,
    /// Smoothed left value, recomputed every frame
    pub current_left: f32,
    /// Smoothed right value, recomputed every frame
    pub current_right: f32,
    /// Spring state for the left channel
    pub smoothing_left: SmoothDamp,
    /// Spring state for the right channel
    pub smoothing_right: SmoothDamp,
    /// True between a continuous feedback start and its end
    pub in_feedback_period: bool,
}

impl FeedbackState {
    /// Fresh state: everything zero, not in a feedback period.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both raw targets as `(left, right)`.
    pub fn targets(&self) -> (f32, f32) {
        (self.target_left, self.target_right)
    }

    /// Both smoothed values as `(left, right)`.
    pub fn current(&self) -> (f32, f32) {
        (self.current_left, self.current_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_and_outside_feedback() {
        let state = FeedbackState::new();
        assert_eq!(state.targets(), (0.0, 0.0));
        assert_eq!(state.current(), (0.0, 0.0));
        assert_eq!(state.smoothing_left.velocity(), 0.0);
        assert_eq!(state.smoothing_right.velocity(), 0.0);
        assert!(!state.in_feedback_period);
    }
}
