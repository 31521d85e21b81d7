//! Gravity sources.
//!
//! A gravity field is a static region of space with a rule for "up". Every
//! shape implements [`FieldGeometry`]; a shape only supplies what it knows
//! natively and the trait derives the rest:
//!
//! | query                    | fallback                                      |
//! |--------------------------|-----------------------------------------------|
//! | `up_vector`              | fixed up, else normalized altitude vector     |
//! | `altitude`               | length of the altitude vector                 |
//! | `altitude_vector`        | fixed up scaled by the altitude               |
//! | `contains`               | altitude test with the computed altitude      |
//! | `contains_with_altitude` | plain containment                             |
//!
//! A shape must provide either an altitude vector, or a fixed up vector
//! together with an altitude; and either a containment test or an altitude
//! test.
//!
//! Fields live in the [`FieldIndex`](crate::resources::fieldindex::FieldIndex)
//! arena and are referred to by [`FieldId`].

pub mod axial;
pub mod homogeneouscylinder;
pub mod radial;
pub mod trivial;
pub mod trivialcylinder;

use crate::math::basis::spherical_matrix_field;
use crate::math::{Fix12, Matrix3x3, Vector3, Vector3Fine};

pub use axial::AxialField;
pub use homogeneouscylinder::HomogeneousCylinderField;
pub use radial::RadialField;
pub use trivial::TrivialField;
pub use trivialcylinder::TrivialCylinderField;

/// Altitude offset of the trivial shapes, so altitudes stay positive.
pub const TRIVIAL_ALTITUDE_OFFSET: Fix12 = Fix12::from_int(30000);

/// Priority of the default field. Authored fields use zero or more.
pub const DEFAULT_PRIORITY: i16 = -1;

/// Geometry queries shared by every gravity shape.
pub trait FieldGeometry {
    /// Up vector when it is the same everywhere.
    fn fixed_up_vector(&self) -> Option<Vector3> {
        None
    }

    fn native_altitude(&self, _pos: &Vector3) -> Option<Fix12> {
        None
    }

    fn native_altitude_vector(&self, _pos: &Vector3) -> Option<Vector3> {
        None
    }

    fn native_contains(&self, _pos: &Vector3) -> Option<bool> {
        None
    }

    fn native_contains_with_altitude(&self, _pos: &Vector3, _altitude: Fix12) -> Option<bool> {
        None
    }

    fn is_homogeneous(&self) -> bool {
        self.fixed_up_vector().is_some()
    }

    /// Unnormalized vector from the source to `pos`.
    fn altitude_vector(&self, pos: &Vector3) -> Vector3 {
        match self.native_altitude_vector(pos) {
            Some(v) => v,
            None => self.up_vector(pos) * self.altitude(pos),
        }
    }

    fn altitude(&self, pos: &Vector3) -> Fix12 {
        match self.native_altitude(pos) {
            Some(a) => a,
            None => self.altitude_vector(pos).length(),
        }
    }

    fn up_vector(&self, pos: &Vector3) -> Vector3 {
        match self.fixed_up_vector() {
            Some(up) => up,
            None => self.altitude_vector(pos).normalized(),
        }
    }

    fn up_vector_fine(&self, pos: &Vector3) -> Vector3Fine {
        match self.fixed_up_vector() {
            Some(up) => up.to_fine(),
            None => self.altitude_vector(pos).normalized_fine(),
        }
    }

    /// Altitude and fine up vector in one pass.
    fn altitude_and_up_fine(&self, pos: &Vector3) -> (Fix12, Vector3Fine) {
        match self.fixed_up_vector() {
            Some(up) => (self.altitude(pos), up.to_fine()),
            None => {
                let v = self.altitude_vector(pos);
                (v.length(), v.normalized_fine())
            }
        }
    }

    fn contains(&self, pos: &Vector3) -> bool {
        match self.native_contains(pos) {
            Some(inside) => inside,
            None => self.contains_with_altitude(pos, self.altitude(pos)),
        }
    }

    /// Containment when the altitude at `pos` is already known.
    fn contains_with_altitude(&self, pos: &Vector3, altitude: Fix12) -> bool {
        match self.native_contains_with_altitude(pos, altitude) {
            Some(inside) => inside,
            None => self.contains(pos),
        }
    }
}

/// Index of a field in the scene arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u16);

impl FieldId {
    /// The default field always sits in slot zero.
    pub const DEFAULT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of gravity shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldShape {
    Default(TrivialField),
    TrivialCylinder(TrivialCylinderField),
    Radial(RadialField),
    Axial(AxialField),
    HomogeneousCylinder(HomogeneousCylinderField),
}

impl FieldShape {
    pub fn geometry(&self) -> &dyn FieldGeometry {
        match self {
            FieldShape::Default(f) => f,
            FieldShape::TrivialCylinder(f) => f,
            FieldShape::Radial(f) => f,
            FieldShape::Axial(f) => f,
            FieldShape::HomogeneousCylinder(f) => f,
        }
    }

    /// Trivial shapes keep the world axes as their frame.
    pub fn is_trivial(&self) -> bool {
        matches!(self, FieldShape::Default(_) | FieldShape::TrivialCylinder(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldShape::Default(_) => "default",
            FieldShape::TrivialCylinder(_) => "trivial-cylinder",
            FieldShape::Radial(_) => "radial",
            FieldShape::Axial(_) => "axial",
            FieldShape::HomogeneousCylinder(_) => "homogeneous-cylinder",
        }
    }
}

/// What kind of actor a first frame is built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActorKind {
    #[default]
    Ordinary,
    /// The player-controlled actor, steered by where the scene is first viewed from.
    Primary { view_point: Vector3 },
}

/// One gravity source placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct GravityField {
    id: FieldId,
    shape: FieldShape,
    priority: i16,
    camera_settings: u8,
    homogeneous: bool,
    trivial: bool,
    pub(crate) next: Option<FieldId>,
}

impl GravityField {
    pub fn new(id: FieldId, shape: FieldShape, priority: i16, camera_settings: u8) -> Self {
        let homogeneous = shape.geometry().is_homogeneous();
        let trivial = shape.is_trivial();
        Self {
            id,
            shape,
            priority,
            camera_settings,
            homogeneous,
            trivial,
            next: None,
        }
    }

    /// The field that owns everything nothing else claims.
    pub fn default_field() -> Self {
        Self::new(
            FieldId::DEFAULT,
            FieldShape::Default(TrivialField),
            DEFAULT_PRIORITY,
            0,
        )
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub fn priority(&self) -> i16 {
        self.priority
    }

    pub fn camera_settings(&self) -> u8 {
        self.camera_settings
    }

    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    pub fn is_default(&self) -> bool {
        self.id == FieldId::DEFAULT
    }

    /// Next field in priority order.
    pub fn next(&self) -> Option<FieldId> {
        self.next
    }

    pub fn homogeneous_up_vector(&self) -> Option<Vector3> {
        self.shape.geometry().fixed_up_vector()
    }

    pub fn contains(&self, pos: &Vector3) -> bool {
        self.shape.geometry().contains(pos)
    }

    pub fn contains_with_altitude(&self, pos: &Vector3, altitude: Fix12) -> bool {
        self.shape.geometry().contains_with_altitude(pos, altitude)
    }

    pub fn altitude(&self, pos: &Vector3) -> Fix12 {
        self.shape.geometry().altitude(pos)
    }

    pub fn altitude_vector(&self, pos: &Vector3) -> Vector3 {
        self.shape.geometry().altitude_vector(pos)
    }

    pub fn up_vector(&self, pos: &Vector3) -> Vector3 {
        self.shape.geometry().up_vector(pos)
    }

    pub fn up_vector_fine(&self, pos: &Vector3) -> Vector3Fine {
        self.shape.geometry().up_vector_fine(pos)
    }

    pub fn altitude_and_up_fine(&self, pos: &Vector3) -> (Fix12, Vector3Fine) {
        self.shape.geometry().altitude_and_up_fine(pos)
    }

    /// Same field, or both trivial. Two trivial fields give the same frame.
    pub fn is_trivial_equivalent(&self, other: &GravityField) -> bool {
        self.id == other.id || (self.trivial && other.trivial)
    }

    /// The basis an actor gets when it is first placed at `pos`.
    pub fn first_field_matrix(&self, pos: &Vector3, kind: ActorKind) -> Matrix3x3 {
        if self.trivial {
            return Matrix3x3::IDENTITY;
        }
        let up = self.up_vector_fine(pos);
        match kind {
            ActorKind::Ordinary => {
                let y = if up.y.is_negative() {
                    -Vector3Fine::UP
                } else {
                    Vector3Fine::UP
                };
                spherical_matrix_field(&Vector3Fine::X, &y, &up)
            }
            ActorKind::Primary { view_point } => {
                let y = self.up_vector_fine(&view_point);
                let x = y.cross(&(*pos - view_point).normalized_fine()).normalized();
                if x.is_zero() {
                    // Viewed from straight above or from the actor itself.
                    return self.first_field_matrix(pos, ActorKind::Ordinary);
                }
                spherical_matrix_field(&x, &y, &up)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A shape that only knows its altitude vector and an altitude test.
    struct Blob;

    impl FieldGeometry for Blob {
        fn native_altitude_vector(&self, pos: &Vector3) -> Option<Vector3> {
            Some(*pos)
        }
        fn native_contains_with_altitude(&self, _pos: &Vector3, altitude: Fix12) -> Option<bool> {
            Some(altitude <= Fix12::from_int(2))
        }
    }

    /// A shape that only knows a fixed up vector, an altitude and a box test.
    struct Slab;

    impl FieldGeometry for Slab {
        fn fixed_up_vector(&self) -> Option<Vector3> {
            Some(Vector3::X)
        }
        fn native_altitude(&self, pos: &Vector3) -> Option<Fix12> {
            Some(pos.x)
        }
        fn native_contains(&self, pos: &Vector3) -> Option<bool> {
            Some(pos.x.abs() < Fix12::ONE)
        }
    }

    #[test]
    fn fallbacks_from_altitude_vector() {
        let p = Vector3::from_num(0.0, 0.0, 1.5);
        assert!(!Blob.is_homogeneous());
        assert_eq!(Blob.altitude(&p), Fix12::from_num(1.5));
        assert_eq!(Blob.up_vector(&p), Vector3::Z);
        assert!(Blob.contains(&p));
        assert!(!Blob.contains(&Vector3::from_num(3.0, 0.0, 0.0)));
        let (alt, up) = Blob.altitude_and_up_fine(&p);
        assert_eq!(alt, Fix12::from_num(1.5));
        assert_eq!(up, Vector3Fine::Z);
    }

    #[test]
    fn fallbacks_from_fixed_up() {
        let p = Vector3::from_num(0.5, 7.0, -3.0);
        assert!(Slab.is_homogeneous());
        assert_eq!(Slab.altitude_vector(&p), Vector3::from_num(0.5, 0.0, 0.0));
        assert_eq!(Slab.up_vector_fine(&p), Vector3Fine::X);
        // Native containment ignores the supplied altitude.
        assert!(Slab.contains_with_altitude(&p, Fix12::from_int(100)));
    }

    #[test]
    fn default_field_properties() {
        let f = GravityField::default_field();
        assert!(f.is_default());
        assert!(f.is_trivial());
        assert!(f.is_homogeneous());
        assert_eq!(f.priority(), DEFAULT_PRIORITY);
        assert_eq!(
            f.first_field_matrix(&Vector3::from_num(4.0, 5.0, 6.0), ActorKind::Ordinary),
            Matrix3x3::IDENTITY
        );
    }

    #[test]
    fn trivial_equivalence() {
        let a = GravityField::default_field();
        let b = GravityField::new(
            FieldId(3),
            FieldShape::TrivialCylinder(TrivialCylinderField::new(
                Vector3::ZERO,
                Fix12::from_int(10),
                Fix12::from_int(10),
            )),
            2,
            0,
        );
        let c = GravityField::new(
            FieldId(4),
            FieldShape::HomogeneousCylinder(HomogeneousCylinderField::new(
                Vector3::ZERO,
                Vector3::from_num(0.0, 10.0, 0.0),
                Fix12::from_int(5),
            )),
            2,
            0,
        );
        assert!(a.is_trivial_equivalent(&b));
        assert!(b.is_trivial_equivalent(&a));
        assert!(c.is_trivial_equivalent(&c));
        assert!(!a.is_trivial_equivalent(&c));
    }

    #[test]
    fn first_matrix_for_sphere_is_orthonormal() {
        let f = GravityField::new(
            FieldId(1),
            FieldShape::Radial(RadialField::new(Vector3::ZERO, Fix12::from_int(100))),
            0,
            0,
        );
        for pos in [
            Vector3::from_num(0.0, 50.0, 0.0),
            Vector3::from_num(30.0, -40.0, 0.0),
            Vector3::from_num(-10.0, 5.0, 60.0),
        ] {
            let m = f.first_field_matrix(&pos, ActorKind::Ordinary);
            assert!(m.is_orthonormal(), "{pos:?}: {m:?}");
            assert!((m.c1 - pos.normalized()).length().raw() <= 4);
            let m = f.first_field_matrix(
                &pos,
                ActorKind::Primary {
                    view_point: Vector3::from_num(0.0, 90.0, 10.0),
                },
            );
            assert!(m.is_orthonormal(), "{pos:?}: {m:?}");
        }
    }
}
