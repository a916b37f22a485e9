//! A critically damped spring that eases a value toward a moving target.
//!
//! This is the usual game-engine "smooth damp": given the elapsed time since
//! the last frame, the current value, the target and the carried velocity,
//! it advances the spring in closed form. The exponential is replaced by its
//! third-order Padé-style approximation, which is accurate for the frame
//! steps we care about and cheaper than `exp`.
//!
//! A step input settles in roughly `smooth_time` and never overshoots: if an
//! update would carry the value past the target, it is clamped onto the
//! target and the velocity is zeroed.

/// Smallest smoothing time accepted; anything below is raised to this.
pub const MIN_SMOOTH_TIME: f32 = 0.0001;

/// One channel of critically damped smoothing. Holds the spring velocity
/// between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothDamp {
    velocity: f32,
}

impl SmoothDamp {
    /// A spring at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current velocity of the spring, in units per second.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Drops any carried velocity.
    pub fn reset(&mut self) {
        self.velocity = 0.0;
    }

    /// Advances the spring by `dt` seconds and returns the new value.
    ///
    /// A non-positive `dt` leaves both the value and the velocity untouched.
    /// Inputs are not validated: a NaN target yields a NaN value.
    pub fn step(&mut self, current: f32, target: f32, smooth_time: f32, dt: f32) -> f32 {
        if dt <= 0.0 {
            return current;
        }

        let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;

        let x = omega * dt;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let change = current - target;
        let temp = (self.velocity + omega * change) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        let mut output = target + (change + temp) * decay;

        // Overshoot guard
        if (target - current > 0.0) == (output > target) {
            output = target;
            self.velocity = 0.0;
        }

        output
    }
}
