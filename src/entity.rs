use bitflags::bitflags;
use lib_arena::FixedVec;
use lib_math::{Vec2, Vec4};
use lib_renderer::WHITE;

pub const MAX_ENTITIES: usize = 128;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u32 {
        const PLAYER = 1 << 0;
        const PROJECTILE = 1 << 1;
        const ASTEROID = 1 << 2;
        /// Removed by the next deletion pass.
        const PENDING_DELETE = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub size: Vec2,
    /// Degrees, counter-clockwise.
    pub rotation: f32,
    /// Degrees per second.
    pub spin: f32,
    pub color: Vec4,
    pub velocity: Vec2,
    /// Seconds left before the entity deletes itself.
    pub lifetime: Option<f32>,
    pub flags: EntityFlags,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ONE,
            rotation: 0.0,
            spin: 0.0,
            color: WHITE,
            velocity: Vec2::ZERO,
            lifetime: None,
            flags: EntityFlags::empty(),
        }
    }
}

impl Entity {
    pub fn radius(&self) -> f32 {
        self.size.max_element() * 0.5
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        let reach = self.radius() + other.radius();

        self.position.distance_squared(other.position) < reach * reach
    }

    pub fn is_alive(&self) -> bool {
        !self.flags.contains(EntityFlags::PENDING_DELETE)
    }

    pub fn mark_for_deletion(&mut self) {
        self.flags.insert(EntityFlags::PENDING_DELETE);
    }
}

/// Every live entity, stored in a fixed-capacity array.
#[derive(Debug, Clone)]
pub struct EntityPool {
    entities: FixedVec<Entity>,
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}

impl EntityPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: FixedVec::new("entity pool", capacity),
        }
    }

    /// Panics if the pool is full. Spawners keep their own counts below the capacity.
    pub fn spawn(&mut self, entity: Entity) -> &mut Entity {
        match self.entities.push(entity) {
            Ok(entity) => entity,
            Err(err) => panic!("{err}: raise MAX_ENTITIES"),
        }
    }

    /// Swap-removes every entity flagged [`EntityFlags::PENDING_DELETE`].
    pub fn remove_pending(&mut self) -> usize {
        self.entities.remove_where(|entity| !entity.is_alive())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn with_flags(&self, flags: EntityFlags) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |entity| entity.flags.contains(flags))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.iter_mut()
            .find(|entity| entity.flags.contains(EntityFlags::PLAYER))
    }
}
