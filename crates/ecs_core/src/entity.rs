//! Entity handles and compile-time component bundles.
//!
//! `Entity` is index-based (`{ id, archetype_hash, row }`) rather than the
//! reference-carrying `{ id, archetype: &Archetype, world: &World }` the
//! distilled spec describes literally — see `DESIGN.md`'s resolution of
//! SPEC_FULL.md §9's entity-representation Open Question. This mirrors the
//! teacher's own `latch_core::ecs::entity::Entity { id, generation,
//! archetype: ArchetypeId, index }`.

use crate::hash::TypeHash;
use crate::type_info::TypeInfo;
use crate::world::World;

/// A value handle to a stored entity. Resolve it back to its archetype
/// with [`World::archetype_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub id: u64,
    pub archetype_hash: u64,
    pub row: usize,
}

/// A compile-time, ordered list of component types. Implemented for
/// tuples of arity 1..=8 below; extends the teacher's hand-duplicated
/// `ComponentBundle` impls (`(T1,)` through `(T1,T2,T3,T4)` in
/// `latch_core/src/ecs/bundle.rs`) to arity 8 via a macro, since a
/// bundle here is purely a type-level descriptor — `create_entity` never
/// writes component values (see SPEC_FULL.md §4.5).
pub trait Bundle {
    /// The per-type hashes of this bundle's component types, in the
    /// bundle's declared order.
    fn type_hashes() -> Vec<TypeHash>;

    /// Resolves each component type's `TypeInfo` against `world`, in the
    /// bundle's declared order.
    fn type_infos(world: &World) -> Vec<TypeInfo>;
}

macro_rules! impl_bundle_for_tuple {
    ($($t:ident),+) => {
        impl<$($t: 'static),+> Bundle for ($($t,)+) {
            fn type_hashes() -> Vec<TypeHash> {
                vec![$(crate::hash::hash_type::<$t>()),+]
            }

            fn type_infos(world: &World) -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$t>(world)),+]
            }
        }
    };
}

impl_bundle_for_tuple!(A);
impl_bundle_for_tuple!(A, B);
impl_bundle_for_tuple!(A, B, C);
impl_bundle_for_tuple!(A, B, C, D);
impl_bundle_for_tuple!(A, B, C, D, E);
impl_bundle_for_tuple!(A, B, C, D, E, F);
impl_bundle_for_tuple!(A, B, C, D, E, F, G);
impl_bundle_for_tuple!(A, B, C, D, E, F, G, H);
