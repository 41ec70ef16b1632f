//! Describes one component type: its hash, layout, and hook pair.

use std::alloc::Layout;

use crate::hash::{hash_type, TypeHash};
use crate::hook::Hook;
use crate::world::World;

/// Everything the storage layer needs to know about a component type,
/// resolved once and carried by value from then on.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    pub hash: TypeHash,
    pub layout: Layout,
    pub hook: Hook,
}

impl TypeInfo {
    /// Resolves `T`'s `TypeInfo` against `world`'s hook table: if a hook
    /// was installed for this type via `World::set_hook` it is used,
    /// otherwise the default drop-glue/memcpy pair. The hook is copied by
    /// value here and will not change if `set_hook` is called again later
    /// for this type — see SPEC_FULL.md §9.
    pub fn of<T: 'static>(world: &World) -> Self {
        let hash = hash_type::<T>();
        let hook = world.get_hook_by_hash(hash).unwrap_or_else(Hook::default_for::<T>);
        TypeInfo {
            hash,
            layout: Layout::new::<T>(),
            hook,
        }
    }

    /// Stride between consecutive elements of this type in a column: the
    /// layout's size rounded up to its own alignment.
    pub fn stride(&self) -> usize {
        self.layout.pad_to_align().size()
    }

    pub fn is_zero_sized(&self) -> bool {
        self.layout.size() == 0
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("hash", &self.hash)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SystemAllocator;

    #[test]
    fn resolves_default_hook_when_none_registered() {
        let world = World::init(Box::new(SystemAllocator));
        let info = TypeInfo::of::<u32>(&world);
        assert_eq!(info.layout.size(), 4);
        assert_eq!(info.stride(), 4);
        assert!(!info.is_zero_sized());
    }

    #[test]
    fn zero_sized_type_reports_zero_size() {
        struct Tag;
        let world = World::init(Box::new(SystemAllocator));
        let info = TypeInfo::of::<Tag>(&world);
        assert!(info.is_zero_sized());
    }
}
