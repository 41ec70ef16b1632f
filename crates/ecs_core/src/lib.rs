//! Storage core for an archetype-based ECS.
//!
//! This crate covers exactly the columnar storage layer: typed and
//! type-erased growable columns, archetypes built from them, and the
//! world that owns the archetype registry and per-type hook table.
//! Query/iteration APIs, system scheduling, entity migration between
//! archetypes, serialization, and multithreaded access are deliberately
//! out of scope — see `SPEC_FULL.md`.
//!
//! The column growth policy (`alloc::grow_capacity`) seeds its initial
//! capacity from a cache line size constant; pair this crate with
//! `ecs_platform::Memory::detect()` and `World::init_with_cache_line` to
//! tune it to the host machine instead of the compiled-in default.

pub mod alloc;
pub mod archetype;
pub mod column;
pub mod entity;
pub mod erased_column;
pub mod error;
pub mod hash;
pub mod hook;
pub mod type_info;
pub mod world;

pub use archetype::Archetype;
pub use entity::{Bundle, Entity};
pub use error::{Result, StorageError};
pub use hash::TypeHash;
pub use hook::Hook;
pub use type_info::TypeInfo;
pub use world::World;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SystemAllocator;

    #[test]
    fn end_to_end_entity_creation() {
        let mut world = World::init(Box::new(SystemAllocator));
        let e = world.create_entity::<(u32, f32)>().unwrap();
        assert_eq!(e.id, 0);
        assert!(world.archetype_of(e).is_some());
    }
}
