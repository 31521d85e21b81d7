//! Per-actor gravity frame.
//!
//! Every attached actor carries a [`GravityFrame`]: an orthonormal basis whose
//! column 1 points away from the gravity source owning the actor, the ring
//! node that records which field that is, and the bookkeeping needed to turn
//! the basis smoothly when the owner changes.
//!
//! # States
//!
//! | state           | meaning                                                  |
//! |-----------------|----------------------------------------------------------|
//! | `Identity`      | owned by a trivial field; the basis is the world frame   |
//! | `Transitioning` | the up vector is still turning toward the new field      |
//! | `Steady`        | settled; homogeneous owners skip recomputation entirely  |
//!
//! The frame is updated from [`crate::systems::gravity::tick_gravity`] right
//! before the actor's behavior runs.

use bevy_ecs::prelude::Component;

use crate::components::frameproperties::FrameProperties;
use crate::components::gravityflags::GravityFlags;
use crate::components::heading::Heading;
use crate::components::worldposition::WorldPosition;
use crate::fields::{FieldId, GravityField};
use crate::math::basis::{convert_angle, heading_direction, spherical_forward_field};
use crate::math::expr;
use crate::math::smoothing::AngularSmoother;
use crate::math::vector::some_orthonormal;
use crate::math::{Angle, Fix12, Matrix3x3, Vector3, Vector3Fine};
use crate::resources::actorlist::{ActorRings, NodeId};
use crate::resources::fieldindex::FieldIndex;
use crate::resources::gravityconfig::OrientationTuning;
use crate::resources::viewaxes::ViewAxes;

/// Orientation state reported by [`GravityFrame::state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Steady,
    Transitioning,
    Identity,
}

/// How the forward axis is chosen when the basis is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Steering {
    /// Keep the previous right axis: `c2 = c0_old x c1`.
    #[default]
    Geometric,
    /// Follow the camera. Used for the primary actor.
    View(ViewAxes),
}

/// Everything a frame update reads from the actor and its surroundings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInput {
    /// The actor's own position.
    pub pos: Vector3,
    /// Where the owning field is looked up: the holder's position for
    /// carried actors, the own position otherwise.
    pub anchor: Vector3,
    pub steering: Steering,
}

impl FrameInput {
    pub fn at(pos: Vector3) -> Self {
        Self {
            pos,
            anchor: pos,
            steering: Steering::Geometric,
        }
    }

    pub fn with_anchor(mut self, anchor: Vector3) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_steering(mut self, steering: Steering) -> Self {
        self.steering = steering;
        self
    }
}

/// What a frame update did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// `(from, to)` when the actor changed owner.
    pub field_change: Option<(FieldId, FieldId)>,
    /// The basis before the update, when the basis was rebuilt.
    pub previous_basis: Option<Matrix3x3>,
}

impl FrameUpdate {
    pub fn reoriented(&self) -> bool {
        self.previous_basis.is_some()
    }
}

#[derive(Component, Clone, Debug)]
pub struct GravityFrame {
    basis: Matrix3x3,
    last_update_point: Vector3,
    /// Anchor of the delta redirect.
    saved_pos: Vector3,
    smoother: AngularSmoother,
    /// Largest angle the up vector may still have to turn.
    remaining_turn: i32,
    node: NodeId,
    field: FieldId,
    field_trivial: bool,
    flags: GravityFlags,
    pub(crate) properties: FrameProperties,
}

impl GravityFrame {
    /// A frame for an actor standing at `pos` inside `field`.
    pub fn new(
        node: NodeId,
        field: &GravityField,
        basis: Matrix3x3,
        flags: GravityFlags,
        pos: Vector3,
    ) -> Self {
        Self {
            basis,
            last_update_point: pos,
            saved_pos: pos,
            smoother: AngularSmoother::new(),
            remaining_turn: 0,
            node,
            field: field.id(),
            field_trivial: field.is_trivial(),
            flags,
            properties: FrameProperties::default(),
        }
    }

    pub fn basis(&self) -> &Matrix3x3 {
        &self.basis
    }

    pub fn up_vector(&self) -> Vector3 {
        self.basis.c1
    }

    pub fn up_vector_fine(&self) -> Vector3Fine {
        self.basis.c1.to_fine().normalized()
    }

    pub fn last_update_point(&self) -> Vector3 {
        self.last_update_point
    }

    pub fn saved_pos(&self) -> Vector3 {
        self.saved_pos
    }

    pub fn remaining_turn(&self) -> i32 {
        self.remaining_turn
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn flags(&self) -> GravityFlags {
        self.flags
    }

    pub fn properties(&self) -> &FrameProperties {
        &self.properties
    }

    pub fn is_transitioning(&self) -> bool {
        self.remaining_turn > 0
    }

    /// Owned by a trivial field and done turning.
    pub fn is_in_trivial_field(&self) -> bool {
        self.field_trivial && self.remaining_turn == 0
    }

    pub fn state(&self) -> FrameState {
        if self.is_in_trivial_field() {
            FrameState::Identity
        } else if self.is_transitioning() {
            FrameState::Transitioning
        } else {
            FrameState::Steady
        }
    }

    /// One tick of orientation maintenance. Re-expresses `heading` in the
    /// new basis when the basis changes.
    pub fn update(
        &mut self,
        input: &FrameInput,
        heading: &mut Heading,
        fields: &FieldIndex,
        rings: &mut ActorRings,
        tuning: &OrientationTuning,
    ) -> FrameUpdate {
        let mut outcome = FrameUpdate::default();

        let delta = input.pos - self.last_update_point;
        let threshold = tuning.move_threshold.raw() as i128;
        if delta.dot_wide(&delta) < threshold * threshold && self.remaining_turn == 0 {
            return outcome;
        }

        if !self.flags.always_in_default_field {
            let found = fields.field_at(&input.anchor);
            let changed = found.priority() >= 0 && found.id() != self.field;
            if changed {
                outcome.field_change = Some((self.field, found.id()));
                rings.move_to(self.node, found.id());
                self.field = found.id();
                self.field_trivial = found.is_trivial();
                self.smoother.reset();
                self.remaining_turn = tuning.transition_budget;
            }

            let owner = fields.field(self.field);
            if changed || !owner.is_homogeneous() || self.remaining_turn > 0 {
                let previous = self.basis;
                let mut smoother = self.smoother;
                let (up, remaining) =
                    self.turn_up_vector(owner, &input.anchor, &mut smoother, tuning);
                self.smoother = smoother;
                self.remaining_turn = remaining;

                if owner.is_trivial() {
                    self.basis = Matrix3x3::IDENTITY;
                    self.remaining_turn = 0;
                    self.smoother.reset();
                } else {
                    self.recompute_basis(&up, input.steering);
                }

                heading.facing = convert_angle(heading.facing, &previous, &self.basis);
                heading.motion = convert_angle(heading.motion, &previous, &self.basis);
                outcome.previous_basis = Some(previous);
            }
        }

        self.last_update_point = input.pos;
        outcome
    }

    /// Advance `smoother` one step from the current up toward the owner's up
    /// at `pos`. Returns the new up and the angle still to turn.
    fn turn_up_vector(
        &self,
        owner: &GravityField,
        pos: &Vector3,
        smoother: &mut AngularSmoother,
        tuning: &OrientationTuning,
    ) -> (Vector3Fine, i32) {
        let mut up = self.basis.c1.to_fine().normalized_twice();
        let target = owner.up_vector_fine(pos);
        let step = smoother.advance(
            &mut up,
            &target,
            tuning.angular_accel,
            false,
            self.remaining_turn,
        );
        (up, step.remaining)
    }

    /// Rebuild the basis around a new up vector.
    pub fn recompute_basis(&mut self, up: &Vector3Fine, steering: Steering) {
        let c1 = up.normalized_twice_coarse();

        let mut c2 = match steering {
            Steering::View(view) => {
                spherical_forward_field(&view.right.to_fine(), &view.back.to_fine(), up)
                    .to_coarse()
            }
            Steering::Geometric => expr::cross_coarse(&self.basis.c0, &c1).eval_coarse(),
        };
        if c2.is_zero() {
            c2 = some_orthonormal(&c1);
        }
        c2.normalize_twice();

        let c0 = expr::cross_coarse(&c1, &c2).eval().normalized_twice_coarse();
        self.basis = Matrix3x3::from_columns(c0, c1, c2);
    }

    /// The up vector the actor would have after moving to `next_pos`, without
    /// touching the frame.
    pub fn predict_up_vector(
        &self,
        next_pos: &Vector3,
        fields: &FieldIndex,
        tuning: &OrientationTuning,
    ) -> Vector3Fine {
        let owner = fields.field(self.field);
        let mut smoother = self.smoother;
        self.turn_up_vector(owner, next_pos, &mut smoother, tuning).0
    }

    /// Extra vertical acceleration that keeps an airborne actor moving along
    /// a curved surface: the component of the horizontal velocity that the
    /// predicted up vector turns into the vertical.
    pub fn curvature_acceleration(
        &self,
        horz_speed: Fix12,
        motion: Angle,
        fields: &FieldIndex,
        tuning: &OrientationTuning,
    ) -> Fix12 {
        let v = heading_direction(motion, &self.basis) * horz_speed;
        let u = self.up_vector_fine();
        let w = self.predict_up_vector(&(self.last_update_point + v), fields, tuning);
        let uw = u.dot(&w);
        if uw.raw() <= 0 {
            return Fix12::ZERO;
        }
        // w.v carries 24 + 12 fractional bits; dividing by a Q24 leaves Q12.
        let wv = [(w.x, v.x), (w.y, v.y), (w.z, v.z)]
            .iter()
            .map(|(a, b)| a.raw() as i128 * b.raw() as i128)
            .sum::<i128>();
        let raw = (wv / uw.raw() as i128).clamp(i32::MIN as i128, i32::MAX as i128);
        Fix12::from_raw(raw as i32)
    }

    /// Start a fresh delta redirect from `pos`, e.g. after a teleport.
    pub fn resync_anchor(&mut self, pos: Vector3) {
        self.saved_pos = pos;
        self.last_update_point = pos;
    }

    /// Turn the movement since the last redirect into the frame:
    /// `pos = anchor + B (pos - anchor)`, then move the anchor to `pos`.
    pub fn redirect_delta(&mut self, pos: &mut Vector3) {
        *pos = pos.rotate_around(&self.saved_pos, &self.basis);
        self.saved_pos = *pos;
    }

    pub fn real_position(&self, pose: &WorldPosition) -> Vector3 {
        self.properties.real_pose(pose).pos
    }

    pub fn real_prev_position(&self, pose: &WorldPosition) -> Vector3 {
        self.properties.real_pose(pose).prev_pos
    }

    pub fn real_facing(&self, heading: &Heading) -> Angle {
        self.properties.real_heading(heading).facing
    }

    pub fn real_motion(&self, heading: &Heading) -> Angle {
        self.properties.real_heading(heading).motion
    }
}
