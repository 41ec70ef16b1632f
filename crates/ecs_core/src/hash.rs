//! Deterministic hashing of component types and type combinations.
//!
//! `hash_type` hashes a type's canonical name with a small Wyhash-style
//! mixing step; `hash_compound`/`hash_compound_info` fold those hashes over
//! an ordered list so that archetypes keyed by "the same types in a
//! different order" hash differently (see SPEC_FULL.md §4.1 — a
//! permutation-insensitive fold collides too readily to key archetypes by).

use std::any::type_name;

/// A stable 64-bit identifier for a component type within one build of the
/// library. Not guaranteed stable across builds or versions — never persist
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHash(pub u64);

const WY_SEED: u64 = 0;
const WY_P0: u64 = 0xa0761d6478bd642f;
const WY_P1: u64 = 0xe7037ed1a0b428db;

fn wymix(a: u64, b: u64) -> u64 {
    let r = (a as u128) * (b as u128);
    ((r & 0xffff_ffff_ffff_ffff) as u64) ^ ((r >> 64) as u64)
}

fn wyhash_bytes(bytes: &[u8], seed: u64) -> u64 {
    let mut seen = wymix(seed ^ WY_P0, WY_P1);
    for chunk in bytes.chunks(8) {
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        let word = u64::from_le_bytes(buf);
        seen = wymix(seen ^ word, WY_P0 ^ chunk.len() as u64);
    }
    wymix(seen, bytes.len() as u64 ^ WY_P1)
}

/// Hashes `T`'s canonical name. Deterministic for the lifetime of one build.
pub fn hash_type<T: 'static>() -> TypeHash {
    TypeHash(wyhash_bytes(type_name::<T>().as_bytes(), WY_SEED))
}

/// `mix2(a, b) = low64(a*b) XOR high64(a*b)` using 128-bit multiplication.
pub fn mix2(a: u64, b: u64) -> u64 {
    let r = (a as u128) * (b as u128);
    ((r & 0xffff_ffff_ffff_ffff) as u64) ^ ((r >> 64) as u64)
}

/// Folds an ordered sequence of per-type hashes into one compound hash.
/// Order-sensitive: `fold_hashes(&[a, b]) != fold_hashes(&[b, a])` in
/// general. The empty fold is `0`, matching the empty-bundle archetype's
/// fixed key (see SPEC_FULL.md §3/§4.5 and `world::EMPTY_ARCHETYPE_HASH`).
pub fn fold_hashes(hashes: impl IntoIterator<Item = u64>) -> u64 {
    let mut hashes = hashes.into_iter();
    let Some(first) = hashes.next() else {
        return 0;
    };
    let mut acc = mix2(WY_P1 ^ first, WY_P0);
    for (i, h) in hashes.enumerate() {
        acc = mix2(acc ^ h, WY_P0.wrapping_add(i as u64 + 1));
    }
    acc
}

/// Compile-time bundle of component types. Implemented for tuples of arity
/// 1..=8 via the macro below; see `entity.rs` for the `Bundle` definition
/// this hash function is generic over.
pub fn hash_compound<B: crate::entity::Bundle>() -> u64 {
    fold_hashes(B::type_hashes().into_iter().map(|h| h.0))
}

/// Runtime variant: folds already-resolved `TypeInfo` hashes in the order
/// given. Used by `Archetype::init` to compute the archetype's key from an
/// arbitrary (but deterministic) list of `TypeInfo`s.
pub fn hash_compound_info(infos: &[crate::type_info::TypeInfo]) -> u64 {
    fold_hashes(infos.iter().map(|i| i.hash.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_same_hash() {
        assert_eq!(hash_type::<u32>(), hash_type::<u32>());
    }

    #[test]
    fn distinct_types_distinct_hash() {
        assert_ne!(hash_type::<u32>(), hash_type::<i64>());
    }

    #[test]
    fn order_sensitive() {
        let a = hash_type::<u32>().0;
        let b = hash_type::<f32>().0;
        assert_ne!(fold_hashes([a, b]), fold_hashes([b, a]));
    }

    #[test]
    fn mix2_is_deterministic() {
        assert_eq!(mix2(1, 2), mix2(1, 2));
    }

    #[test]
    fn empty_fold_is_zero() {
        assert_eq!(fold_hashes(std::iter::empty()), 0);
        assert_eq!(hash_compound_info(&[]), 0);
    }
}
