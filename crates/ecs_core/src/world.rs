//! The world: registry of archetypes, custodian of per-type hooks, and
//! issuer of entity IDs.
//!
//! Generalizes `latch_core/src/ecs/world.rs`'s `World { next_entity_id,
//! storages: HashMap<ArchetypeId, ArchetypeStorage>, .. }` from its
//! double-buffered `ArchetypeStorage` to this spec's single-buffer
//! `Archetype`, and its `spawn()` resolve-or-create pattern to
//! `create_entity`.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::alloc::{RawAllocator, DEFAULT_CACHE_LINE_BYTES};
use crate::archetype::Archetype;
use crate::entity::{Bundle, Entity};
use crate::error::Result;
use crate::hash::{hash_compound, TypeHash};
use crate::hook::Hook;

/// Archetype key for the bundle-less archetype every `World` starts with.
const EMPTY_ARCHETYPE_HASH: u64 = 0;

/// Owns every archetype, the per-type hook overrides, and the monotonic
/// entity ID counter. The only type in this core with a `Drop` impl: it
/// is the sole owner of the allocator handle, so it is the only type
/// that can cascade-free its children automatically (see SPEC_FULL.md
/// §4.5 and `DESIGN.md`).
pub struct World {
    allocator: Box<dyn RawAllocator>,
    next_entity_id: u64,
    archetypes: HashMap<u64, Archetype>,
    hooks: HashMap<TypeHash, Hook>,
    cache_line_bytes: usize,
}

impl World {
    /// Creates a world backed by `allocator`, with the empty-bundle
    /// archetype already registered at hash 0.
    pub fn init(allocator: Box<dyn RawAllocator>) -> Self {
        Self::init_with_cache_line(allocator, DEFAULT_CACHE_LINE_BYTES)
    }

    /// Creates a world whose growth policy is seeded from the host's
    /// actual cache line size, as probed by `ecs_platform`. Requires the
    /// `platform` feature.
    #[cfg(feature = "platform")]
    pub fn init_with_detected_platform(allocator: Box<dyn RawAllocator>) -> Self {
        let cache_line_bytes = ecs_platform::Memory::detect().cache_line;
        Self::init_with_cache_line(allocator, cache_line_bytes)
    }

    /// Same as [`Self::init`] but with an explicit cache line size, for
    /// callers that probed the host via `ecs_platform::Memory::detect()`.
    pub fn init_with_cache_line(allocator: Box<dyn RawAllocator>, cache_line_bytes: usize) -> Self {
        let mut archetypes = HashMap::new();
        let empty = Archetype::init(Vec::new(), cache_line_bytes)
            .expect("the empty bundle can never contain a duplicate component");
        archetypes.insert(EMPTY_ARCHETYPE_HASH, empty);
        debug!(cache_line_bytes, "world initialized");
        World {
            allocator,
            next_entity_id: 0,
            archetypes,
            hooks: HashMap::new(),
            cache_line_bytes,
        }
    }

    pub fn allocator(&self) -> &dyn RawAllocator {
        self.allocator.as_ref()
    }

    pub(crate) fn get_hook_by_hash(&self, hash: TypeHash) -> Option<Hook> {
        self.hooks.get(&hash).copied()
    }

    /// Returns the registered hook for `T`, or the default drop-glue/
    /// memcpy pair if none was installed.
    pub fn get_hook<T: 'static>(&self) -> Hook {
        self.get_hook_by_hash(crate::hash::hash_type::<T>())
            .unwrap_or_else(Hook::default_for::<T>)
    }

    /// Installs (or overwrites) the hook used for `T` going forward.
    /// Columns already erased with the previous hook keep using it — see
    /// SPEC_FULL.md §9's hook-resolution-timing note.
    pub fn set_hook<T: 'static>(&mut self, hook: Hook) {
        self.hooks.insert(crate::hash::hash_type::<T>(), hook);
    }

    /// Resolves (creating if necessary) the archetype for `B`, appends a
    /// freshly minted entity to it, and returns the new entity handle.
    /// Component values are not written; the caller populates them
    /// through a typed cast of the returned entity's row (see
    /// SPEC_FULL.md §4.4/§4.5).
    pub fn create_entity<B: Bundle>(&mut self) -> Result<Entity> {
        let hash = hash_compound::<B>();
        if !self.archetypes.contains_key(&hash) {
            let infos = B::type_infos(self);
            trace!(hash, "creating new archetype for bundle");
            let archetype = Archetype::init(infos, self.cache_line_bytes)?;
            self.archetypes.insert(hash, archetype);
        }
        let id = self.next_entity_id;
        let archetype = self
            .archetypes
            .get_mut(&hash)
            .expect("just inserted or already present");
        let row = archetype.append_entity(self.allocator.as_ref(), id)?;
        self.next_entity_id += 1;
        trace!(id, hash, row, "entity created");
        Ok(Entity {
            id,
            archetype_hash: hash,
            row,
        })
    }

    /// Looks up the archetype an entity was placed in. Returns `None` if
    /// the archetype has since been removed (not possible in this core,
    /// which never removes archetypes, but kept `Option` for forward
    /// compatibility with a future move/removal layer).
    pub fn archetype_of(&self, entity: Entity) -> Option<&Archetype> {
        self.archetypes.get(&entity.archetype_hash)
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    pub fn entity_count(&self) -> u64 {
        self.next_entity_id
    }
}

impl Drop for World {
    fn drop(&mut self) {
        for archetype in self.archetypes.values_mut() {
            archetype.deinit(self.allocator.as_ref());
        }
        debug!("world dropped");
    }
}
