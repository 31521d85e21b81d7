//! Per-field actor membership rings.
//!
//! Every attached actor owns one ring node. The nodes of all actors in the
//! same field form a circular doubly-linked list; the field only remembers
//! the most recently inserted node (`last`). Nodes live in a slot arena with
//! a free list, so moving an actor between fields never allocates.
//!
//! Insertion places the new node after `last` and makes it the new `last`.
//! Removing `last` hands that role to its predecessor, or empties the list
//! when the node was alone.

use bevy_ecs::prelude::*;
use log::warn;
use rustc_hash::FxHashMap;

use crate::components::gravityflags::GravityFlags;
use crate::fields::FieldId;

/// Stable handle of a ring node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug)]
struct RingNode {
    entity: Entity,
    flags: GravityFlags,
    field: FieldId,
    next: NodeId,
    prev: NodeId,
    /// Linked into its field's ring.
    linked: bool,
}

/// Head of one field's ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActorList {
    last: Option<NodeId>,
}

impl ActorList {
    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }
}

/// All rings of the scene, indexed by field.
#[derive(Resource, Debug, Default)]
pub struct ActorRings {
    nodes: Vec<Option<RingNode>>,
    free: Vec<NodeId>,
    lists: Vec<ActorList>,
    by_entity: FxHashMap<Entity, NodeId>,
}

impl ActorRings {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: NodeId) -> Option<&RingNode> {
        self.nodes.get(id.index()).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut RingNode> {
        self.nodes.get_mut(id.index()).and_then(|n| n.as_mut())
    }

    fn set_next(&mut self, id: NodeId, next: NodeId) {
        if let Some(n) = self.node_mut(id) {
            n.next = next;
        }
    }

    fn set_prev(&mut self, id: NodeId, prev: NodeId) {
        if let Some(n) = self.node_mut(id) {
            n.prev = prev;
        }
    }

    fn list_mut(&mut self, field: FieldId) -> &mut ActorList {
        if self.lists.len() <= field.index() {
            self.lists.resize(field.index() + 1, ActorList::default());
        }
        &mut self.lists[field.index()]
    }

    pub fn list(&self, field: FieldId) -> ActorList {
        self.lists.get(field.index()).copied().unwrap_or_default()
    }

    /// Create a node for `entity` and link it into `field`.
    pub fn attach(
        &mut self,
        entity: Entity,
        flags: GravityFlags,
        field: FieldId,
    ) -> Result<NodeId, String> {
        if self.by_entity.contains_key(&entity) {
            return Err(format!("{entity:?} is already attached"));
        }
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let raw = u32::try_from(self.nodes.len())
                    .map_err(|_| "actor ring arena is full".to_string())?;
                self.nodes.push(None);
                NodeId(raw)
            }
        };
        self.nodes[id.index()] = Some(RingNode {
            entity,
            flags,
            field,
            next: id,
            prev: id,
            linked: false,
        });
        self.by_entity.insert(entity, id);
        self.insert(field, id);
        Ok(id)
    }

    /// Unlink and free the node of `entity`.
    pub fn detach(&mut self, entity: Entity) -> Result<NodeId, String> {
        let id = self
            .by_entity
            .remove(&entity)
            .ok_or_else(|| format!("{entity:?} is not attached"))?;
        self.remove(id);
        self.nodes[id.index()] = None;
        self.free.push(id);
        Ok(id)
    }

    /// Link `id` into `field` as its new last node.
    pub fn insert(&mut self, field: FieldId, id: NodeId) {
        match self.node(id) {
            Some(n) if !n.linked => {}
            Some(_) => {
                warn!("ring node {:?} is already linked", id);
                return;
            }
            None => return,
        }
        let last = self.list_mut(field).last;
        let (next, prev) = match last {
            None => (id, id),
            Some(last) => {
                let first = self.node(last).map_or(last, |n| n.next);
                (first, last)
            }
        };
        if let Some(n) = self.node_mut(id) {
            n.next = next;
            n.prev = prev;
            n.field = field;
            n.linked = true;
        }
        if prev != id {
            self.set_next(prev, id);
            self.set_prev(next, id);
        }
        self.list_mut(field).last = Some(id);
    }

    /// Unlink `id` from its field's ring. The node stays allocated.
    pub fn remove(&mut self, id: NodeId) {
        let Some(&RingNode {
            field,
            next,
            prev,
            linked: true,
            ..
        }) = self.node(id)
        else {
            return;
        };
        let list = self.list_mut(field);
        if list.last == Some(id) {
            list.last = if prev == id { None } else { Some(prev) };
        }
        self.set_next(prev, next);
        self.set_prev(next, prev);
        if let Some(n) = self.node_mut(id) {
            n.next = id;
            n.prev = id;
            n.linked = false;
        }
    }

    /// Move `id` into the ring of `field`.
    pub fn move_to(&mut self, id: NodeId, field: FieldId) {
        self.remove(id);
        self.insert(field, id);
    }

    pub fn node_of(&self, entity: Entity) -> Option<NodeId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn entity(&self, id: NodeId) -> Option<Entity> {
        self.node(id).map(|n| n.entity)
    }

    pub fn field_of(&self, id: NodeId) -> Option<FieldId> {
        self.node(id).map(|n| n.field)
    }

    pub fn flags(&self, id: NodeId) -> Option<GravityFlags> {
        self.node(id).map(|n| n.flags)
    }

    /// Every other member of `id`'s ring, starting after it.
    pub fn others(&self, id: NodeId) -> RingIter<'_> {
        let first = self.node(id).filter(|n| n.linked).map(|n| n.next);
        RingIter {
            rings: self,
            cursor: first.filter(|&f| f != id),
            stop: id,
        }
    }

    /// Every member of `field`'s ring, oldest first.
    pub fn members(&self, field: FieldId) -> RingIter<'_> {
        let first = self
            .list(field)
            .last
            .and_then(|last| self.node(last))
            .map(|n| n.next);
        RingIter {
            rings: self,
            cursor: first,
            stop: first.unwrap_or(NodeId(u32::MAX)),
        }
    }

    pub fn len(&self, field: FieldId) -> usize {
        self.members(field).count()
    }

    pub fn is_empty(&self, field: FieldId) -> bool {
        self.list(field).is_empty()
    }

    /// Number of attached actors across every field.
    pub fn attached(&self) -> usize {
        self.by_entity.len()
    }

    /// Forget every node and ring. Used when a scene unloads.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.lists.clear();
        self.by_entity.clear();
    }
}

/// A ring member seen through [`RingIter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member {
    pub node: NodeId,
    pub entity: Entity,
    pub flags: GravityFlags,
}

/// Walks a ring, ending before it comes back to `stop`.
pub struct RingIter<'a> {
    rings: &'a ActorRings,
    cursor: Option<NodeId>,
    stop: NodeId,
}

impl Iterator for RingIter<'_> {
    type Item = Member;

    fn next(&mut self) -> Option<Member> {
        let id = self.cursor?;
        let node = self.rings.node(id)?;
        self.cursor = (node.next != self.stop).then_some(node.next);
        Some(Member {
            node: id,
            entity: node.entity,
            flags: node.flags,
        })
    }
}
