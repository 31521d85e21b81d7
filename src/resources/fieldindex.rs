//! Scene-wide gravity field index.
//!
//! [`FieldIndex`] owns every field of the current scene in one arena: slot 0
//! holds the default field, the authored fields follow in priority order and
//! are linked into a chain. Resolution walks that chain, so the first
//! priority level that contains a point wins and, within that level, the
//! field closest to the point by altitude.
//!
//! The arena is built once per scene from [`LevelPaths`] and dropped
//! wholesale when the scene unloads.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::fields::{
    AxialField, FieldId, FieldShape, GravityField, HomogeneousCylinderField, RadialField,
    TrivialCylinderField,
};
use crate::math::{Fix12, Vector3};
use crate::resources::levelpaths::{
    LevelPaths, PathDescriptor, SHAPE_HOMOGENEOUS_CYLINDER, SHAPE_RADIAL_OR_AXIAL,
    SHAPE_TRIVIAL_CYLINDER,
};

type ShapeList = SmallVec<[FieldShape; 4]>;

/// Resource holding the gravity fields of the loaded scene.
#[derive(Resource, Debug, Clone)]
pub struct FieldIndex {
    fields: Vec<GravityField>,
    head: Option<FieldId>,
}

impl Default for FieldIndex {
    fn default() -> Self {
        Self {
            fields: vec![GravityField::default_field()],
            head: None,
        }
    }
}

/// Stable insertion sort: `before(a, b)` says `a` must precede `b`.
fn insertion_sort_by<T>(items: &mut [T], mut before: impl FnMut(&T, &T) -> bool) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && before(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Shapes a single path produces. Malformed paths produce none.
fn generate_shapes(path: &PathDescriptor) -> ShapeList {
    let mut shapes = ShapeList::new();
    let n = path.num_nodes();
    if n < 2 {
        debug!("gravity path with {} node(s) skipped", n);
        return shapes;
    }
    let nodes: SmallVec<[Vector3; 8]> = path.nodes().collect();
    match path.shape {
        SHAPE_RADIAL_OR_AXIAL if n == 2 => {
            shapes.push(FieldShape::Radial(RadialField::from_points(
                nodes[0], nodes[1],
            )));
        }
        SHAPE_RADIAL_OR_AXIAL => {
            // The last node only marks the radius around the last chain node.
            let chain = &nodes[..n - 1];
            let radius = chain[chain.len() - 1].dist(&nodes[n - 1]);
            for pair in chain.windows(2) {
                shapes.push(FieldShape::Axial(AxialField::new(pair[0], pair[1], radius)));
            }
        }
        SHAPE_HOMOGENEOUS_CYLINDER if n >= 3 => {
            shapes.push(FieldShape::HomogeneousCylinder(
                HomogeneousCylinderField::from_points(nodes[0], nodes[1], nodes[2]),
            ));
        }
        SHAPE_TRIVIAL_CYLINDER => {
            shapes.push(FieldShape::TrivialCylinder(TrivialCylinderField::from_points(
                nodes[0], nodes[1],
            )));
        }
        SHAPE_HOMOGENEOUS_CYLINDER => {
            debug!("homogeneous cylinder path needs 3 nodes, has {}", n);
        }
        other => {
            warn!("unknown gravity path shape {:#x} skipped", other);
        }
    }
    shapes
}

impl FieldIndex {
    /// Build the arena from authored paths.
    ///
    /// Non-gravity paths and malformed ones are skipped. Paths are ordered by
    /// priority, highest first; equal priorities keep authoring order.
    pub fn build<'a>(paths: impl IntoIterator<Item = &'a PathDescriptor>) -> Self {
        let mut gravity: Vec<&PathDescriptor> =
            paths.into_iter().filter(|p| p.is_gravity_path()).collect();
        insertion_sort_by(&mut gravity, |a, b| a.priority > b.priority);

        let generated: Vec<(&PathDescriptor, ShapeList)> = gravity
            .into_iter()
            .map(|p| (p, generate_shapes(p)))
            .filter(|(_, shapes)| !shapes.is_empty())
            .collect();
        let total: usize = generated.iter().map(|(_, s)| s.len()).sum();

        let mut fields = Vec::with_capacity(1 + total);
        fields.push(GravityField::default_field());
        for (path, shapes) in generated {
            for shape in shapes {
                let Ok(raw_id) = u16::try_from(fields.len()) else {
                    warn!("too many gravity fields, dropping the rest");
                    break;
                };
                fields.push(GravityField::new(
                    FieldId(raw_id),
                    shape,
                    path.priority,
                    path.camera_settings,
                ));
            }
        }

        let count = fields.len();
        for i in 1..count {
            fields[i].next = if i + 1 < count {
                Some(FieldId((i + 1) as u16))
            } else {
                None
            };
        }
        let head = (count > 1).then_some(FieldId(1));

        info!("Built {} gravity field(s)", count - 1);
        Self { fields, head }
    }

    pub fn from_level(level: &LevelPaths) -> Self {
        Self::build(&level.paths)
    }

    /// Drop every authored field, keeping only the default one.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn default_field(&self) -> &GravityField {
        &self.fields[0]
    }

    pub fn get(&self, id: FieldId) -> Option<&GravityField> {
        self.fields.get(id.index())
    }

    /// The field with `id`, or the default field for an unknown id.
    pub fn field(&self, id: FieldId) -> &GravityField {
        self.get(id).unwrap_or_else(|| self.default_field())
    }

    /// Number of authored fields.
    pub fn len(&self) -> usize {
        self.fields.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Authored fields in priority order.
    pub fn iter(&self) -> FieldChain<'_> {
        FieldChain {
            index: self,
            next: self.head,
        }
    }

    /// The field owning `pos`.
    pub fn field_at(&self, pos: &Vector3) -> &GravityField {
        let mut chain = self.iter();
        let Some(mut best) = chain.by_ref().find(|f| f.contains(pos)) else {
            return self.default_field();
        };
        let mut best_altitude: Fix12 = best.altitude(pos);
        for field in chain {
            if field.priority() != best.priority() {
                break;
            }
            let altitude = field.altitude(pos);
            if altitude < best_altitude && field.contains_with_altitude(pos, altitude) {
                best = field;
                best_altitude = altitude;
            }
        }
        best
    }

    /// Like [`field_at`](Self::field_at), but actors pinned to the default
    /// field always get it.
    pub fn field_for(&self, pos: &Vector3, always_in_default: bool) -> &GravityField {
        if always_in_default {
            self.default_field()
        } else {
            self.field_at(pos)
        }
    }
}

/// Iterator over the authored fields in priority order.
pub struct FieldChain<'a> {
    index: &'a FieldIndex,
    next: Option<FieldId>,
}

impl<'a> Iterator for FieldChain<'a> {
    type Item = &'a GravityField;

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.index.get(self.next?)?;
        self.next = field.next();
        Some(field)
    }
}
