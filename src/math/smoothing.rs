//! Smoothing controllers.
//!
//! - [`AngularSmoother`]: acceleration-bounded rotation of a unit vector
//!   toward a target, used when an actor's up vector changes.
//! - [`SmoothInterp`]: retargetable cubic that keeps value and speed continuous.
//! - [`UnitSmoothInterp`]: smooth 0 to 1 ramp that can reverse mid-flight.

use super::fixed::Fix12;
use super::vector::Vector3Fine;

/// Result of one [`AngularSmoother::advance`] step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AngularStep {
    /// Angle still separating the vector from the target after the step.
    pub remaining: i32,
    /// Angle travelled during the step.
    pub traveled: i32,
}

/// Rotates a unit vector toward a target with bounded angular acceleration.
///
/// The velocity is stored as a non-positive angle per step: it only ever
/// closes the gap. The controller accelerates until the braking distance
/// `v^2 / (2a)` reaches the remaining angle, then decelerates so the target
/// is reached with zero velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AngularSmoother {
    velocity: i32,
}

impl AngularSmoother {
    pub fn new() -> Self {
        Self { velocity: 0 }
    }

    pub fn velocity(&self) -> i32 {
        self.velocity
    }

    /// Stop immediately.
    pub fn reset(&mut self) {
        self.velocity = 0;
    }

    /// Rotate `v` toward `target` by one step.
    ///
    /// The gap is first clamped to `max_angle`, so `remaining` never exceeds
    /// it. A zero `remaining` means `v` was snapped onto `target` exactly.
    /// With `brake` the controller decelerates regardless of the gap. A
    /// non-positive `accel` leaves everything untouched.
    pub fn advance(
        &mut self,
        v: &mut Vector3Fine,
        target: &Vector3Fine,
        accel: i32,
        brake: bool,
        max_angle: i32,
    ) -> AngularStep {
        let gap = v.angle_to(target);
        let curr = gap.min(max_angle.max(0));
        if accel <= 0 {
            return AngularStep {
                remaining: curr,
                traveled: 0,
            };
        }

        let vel = self.velocity as i64;
        let braking_distance = vel * vel / (2 * accel as i64);
        if curr as i64 > braking_distance && !brake {
            self.velocity -= accel;
        } else {
            self.velocity = (self.velocity + accel).min(0);
        }

        if -self.velocity < curr {
            let remaining = curr + self.velocity;
            v.set_max_angle_to_normalized(target, remaining);
            AngularStep {
                remaining,
                traveled: -self.velocity,
            }
        } else {
            self.velocity = 0;
            *v = *target;
            AngularStep {
                remaining: 0,
                traveled: curr,
            }
        }
    }
}

/// Cubic interpolation toward a target that can change at any time.
///
/// Retargeting restarts the curve from the current value and speed, so the
/// output never jumps. `t` runs from 0 to 1; the curve reaches the target
/// with zero speed at `t = 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmoothInterp {
    target: Fix12,
    offset: Fix12,
    speed: Fix12,
    t: Fix12,
}

impl Default for SmoothInterp {
    fn default() -> Self {
        Self::new(Fix12::ZERO, Fix12::ZERO, Fix12::ZERO)
    }
}

impl SmoothInterp {
    pub fn new(start: Fix12, end: Fix12, start_speed: Fix12) -> Self {
        Self {
            target: end,
            offset: start - end,
            speed: start_speed,
            t: Fix12::ZERO,
        }
    }

    fn k2h(&self) -> Fix12 {
        self.speed + (self.offset << 1)
    }

    pub fn value(&self) -> Fix12 {
        let u = self.t - Fix12::ONE;
        u * u * (self.k2h() * self.t + self.offset) + self.target
    }

    /// Derivative with respect to `t`.
    pub fn speed(&self) -> Fix12 {
        let u = self.t - Fix12::ONE;
        u * ((self.k2h() * self.t) * 3 - self.speed)
    }

    pub fn target(&self) -> Fix12 {
        self.target
    }

    pub fn t(&self) -> Fix12 {
        self.t
    }

    pub fn is_finished(&self) -> bool {
        self.t >= Fix12::ONE
    }

    pub fn set_target(&mut self, target: Fix12) {
        *self = Self::new(self.value(), target, self.speed());
    }

    /// Step `t` toward 1 and return the new value.
    pub fn advance(&mut self, dt: Fix12) -> Fix12 {
        self.t.approach_linear(Fix12::ONE, dt);
        self.value()
    }
}

/// Smooth ramp between 0 and 1 that can reverse without a jump.
///
/// Forward runs from 0 to 1, backward from 1 to 0. Reversing mid-flight
/// re-fits the remaining curve so value and slope stay continuous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSmoothInterp {
    t: Fix12,
    end: Fix12,
    lc: Fix12,
    complement: bool,
}

impl Default for UnitSmoothInterp {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitSmoothInterp {
    /// A forward ramp sitting at 0.
    pub fn new() -> Self {
        Self {
            t: Fix12::ZERO,
            end: Fix12::ONE,
            lc: Fix12::from_int(2),
            complement: true,
        }
    }

    fn raw_value(&self) -> Fix12 {
        let u = self.t - self.end;
        u * u * (u * self.lc + Fix12::from_int(3))
    }

    pub fn value(&self) -> Fix12 {
        let val = self.raw_value();
        if self.complement { Fix12::ONE - val } else { val }
    }

    /// Advance by `dt` and return the new value.
    pub fn next_value(&mut self, dt: Fix12) -> Fix12 {
        self.t.approach_linear(self.end, dt);
        self.value()
    }

    pub fn is_finished(&self) -> bool {
        self.t == self.end
    }

    pub fn is_direction_forward(&self) -> bool {
        self.complement
    }

    pub fn switch_direction(&mut self) {
        let u = self.t - self.end;
        let v = u * self.lc;
        let w = v >> 1;
        let two = Fix12::from_int(2);
        self.end = (u * u * (w * w - two) + Fix12::ONE).sqrt() - u * (w + Fix12::ONE);
        let end = self.end;
        self.lc = (two - u * ((end + u) * 6 + v * (end * 3 + (u << 1)))) / (end * end * end);
        self.t = Fix12::ZERO;
        self.complement = !self.complement;
    }

    pub fn set_direction_forward(&mut self) {
        if !self.complement {
            self.switch_direction();
        }
    }

    pub fn set_direction_backward(&mut self) {
        if self.complement {
            self.switch_direction();
        }
    }
}

/// `t^2 (3 - 2t)`: zero slope at both ends of `[0, 1]`.
pub fn smooth_step(t: Fix12) -> Fix12 {
    t * t * (Fix12::from_int(3) - (t << 1))
}

/// Apply [`smooth_step`] `times` times, flattening the ends further each pass.
pub fn iterate_smooth_step(mut t: Fix12, times: u32) -> Fix12 {
    for _ in 0..times {
        t = smooth_step(t);
    }
    t
}
