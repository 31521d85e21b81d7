//! Convertible actor properties.
//!
//! While another actor's behavior runs, a dependent actor's position and
//! heading are temporarily re-expressed in the running actor's gravity frame
//! (convert) and put back afterwards (restore). Each property remembers the
//! value it had before conversion (`original`) and the value conversion
//! produced (`transformed`):
//!
//! - if nothing touched the property in between, restore puts `original`
//!   back bit for bit;
//! - otherwise the new value is mapped back with the inverse conversion.
//!
//! An actor spawned by a behavior starts out expressed in the spawner's
//! frame; [`FrameProperties::initialize`] records its values as transformed
//! and computes the real values with the inverse conversion.

use crate::components::heading::Heading;
use crate::components::worldposition::WorldPosition;
use crate::math::basis::convert_angle;
use crate::math::{Angle, Matrix3x3, Vector3};

/// One value with its pre- and post-conversion copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Property<T> {
    original: T,
    transformed: T,
}

impl<T: Copy + PartialEq> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            original: value,
            transformed: value,
        }
    }

    pub fn original(&self) -> T {
        self.original
    }

    pub fn transformed(&self) -> T {
        self.transformed
    }

    /// Remember `value` with no conversion applied.
    pub fn capture(&mut self, value: T) {
        self.original = value;
        self.transformed = value;
    }

    /// Save `value`, convert it in place and remember the result.
    pub fn convert(&mut self, value: &mut T, forward: impl FnOnce(T) -> T) {
        self.original = *value;
        *value = forward(*value);
        self.transformed = *value;
    }

    /// Undo a conversion.
    pub fn restore(&self, value: &mut T, inverse: impl FnOnce(T) -> T) {
        *value = if *value == self.transformed {
            self.original
        } else {
            inverse(*value)
        };
    }

    /// Treat `value` as already converted and derive the original from it.
    pub fn initialize(&mut self, value: T, inverse: impl FnOnce(T) -> T) {
        self.capture(value);
        self.original = inverse(self.original);
    }
}

/// How to move values between a dependent actor's frame and a pivot's frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConversion {
    /// Basis of the actor whose values are converted.
    pub own_basis: Matrix3x3,
    /// Basis of the actor whose behavior is running.
    pub pivot_basis: Matrix3x3,
    /// Positions rotate around this point.
    pub pivot_point: Vector3,
}

impl FrameConversion {
    pub fn new(own_basis: Matrix3x3, pivot_basis: Matrix3x3, pivot_point: Vector3) -> Self {
        Self {
            own_basis,
            pivot_basis,
            pivot_point,
        }
    }

    /// World position into the pivot's local frame.
    pub fn forward_position(&self, p: Vector3) -> Vector3 {
        p.rotate_around(&self.pivot_point, &self.pivot_basis.transpose())
    }

    pub fn inverse_position(&self, p: Vector3) -> Vector3 {
        p.rotate_around(&self.pivot_point, &self.pivot_basis)
    }

    /// Heading in the own frame into a heading in the pivot's frame.
    pub fn forward_angle(&self, a: Angle) -> Angle {
        convert_angle(a, &self.own_basis, &self.pivot_basis)
    }

    pub fn inverse_angle(&self, a: Angle) -> Angle {
        convert_angle(a, &self.pivot_basis, &self.own_basis)
    }
}

/// The four convertible properties of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameProperties {
    pub pos: Property<Vector3>,
    pub prev_pos: Property<Vector3>,
    pub facing: Property<Angle>,
    pub motion: Property<Angle>,
    converted: bool,
}

impl FrameProperties {
    pub fn captured(pose: &WorldPosition, heading: &Heading) -> Self {
        let mut props = Self::default();
        props.capture(pose, heading);
        props
    }

    /// The properties currently hold converted values.
    pub fn is_converted(&self) -> bool {
        self.converted
    }

    pub fn capture(&mut self, pose: &WorldPosition, heading: &Heading) {
        self.pos.capture(pose.pos);
        self.prev_pos.capture(pose.prev_pos);
        self.facing.capture(heading.facing);
        self.motion.capture(heading.motion);
        self.converted = false;
    }

    pub fn convert(
        &mut self,
        pose: &mut WorldPosition,
        heading: &mut Heading,
        conv: &FrameConversion,
    ) {
        self.pos.convert(&mut pose.pos, |p| conv.forward_position(p));
        self.prev_pos
            .convert(&mut pose.prev_pos, |p| conv.forward_position(p));
        self.facing
            .convert(&mut heading.facing, |a| conv.forward_angle(a));
        self.motion
            .convert(&mut heading.motion, |a| conv.forward_angle(a));
        self.converted = true;
    }

    pub fn restore(
        &mut self,
        pose: &mut WorldPosition,
        heading: &mut Heading,
        conv: &FrameConversion,
    ) {
        self.pos.restore(&mut pose.pos, |p| conv.inverse_position(p));
        self.prev_pos
            .restore(&mut pose.prev_pos, |p| conv.inverse_position(p));
        self.facing
            .restore(&mut heading.facing, |a| conv.inverse_angle(a));
        self.motion
            .restore(&mut heading.motion, |a| conv.inverse_angle(a));
        self.converted = false;
    }

    /// Properties of an actor spawned inside a pivot's behavior: the values
    /// on `pose` and `heading` are in the pivot's frame.
    pub fn initialize(&mut self, pose: &WorldPosition, heading: &Heading, conv: &FrameConversion) {
        self.pos.initialize(pose.pos, |p| conv.inverse_position(p));
        self.prev_pos
            .initialize(pose.prev_pos, |p| conv.inverse_position(p));
        self.facing
            .initialize(heading.facing, |a| conv.inverse_angle(a));
        self.motion
            .initialize(heading.motion, |a| conv.inverse_angle(a));
        self.converted = true;
    }

    /// The world pose, whatever the properties currently hold.
    pub fn real_pose(&self, pose: &WorldPosition) -> WorldPosition {
        if self.converted {
            WorldPosition {
                pos: self.pos.original(),
                prev_pos: self.prev_pos.original(),
            }
        } else {
            *pose
        }
    }

    pub fn real_heading(&self, heading: &Heading) -> Heading {
        if self.converted {
            Heading::new(self.facing.original(), self.motion.original())
        } else {
            *heading
        }
    }
}
