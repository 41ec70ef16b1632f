//! An archetype: a fixed set of component types, one erased column per
//! non-zero-sized component, a tag set for zero-sized ones, and the
//! roster of entities stored there.
//!
//! The roster lives here rather than in the `World` — see
//! `DESIGN.md`'s resolution of SPEC_FULL.md §9's roster-location Open
//! Question, grounded on `bruno1308-nomai-engine`'s
//! `Archetype { id, component_types, columns, entities }`.

use std::collections::{HashMap, HashSet};

use crate::alloc::RawAllocator;
use crate::error::{Result, StorageError};
use crate::erased_column::ErasedColumn;
use crate::hash::{hash_compound_info, TypeHash};
use crate::type_info::TypeInfo;

pub struct Archetype {
    pub hash: u64,
    infos: Vec<TypeInfo>,
    tags: HashSet<TypeHash>,
    column_index: HashMap<TypeHash, usize>,
    columns: Vec<ErasedColumn>,
    entities: Vec<u64>,
    cache_line_bytes: usize,
}

impl Archetype {
    /// Builds a new archetype from an ordered list of component
    /// `TypeInfo`s. Rejects bundles that name the same component type
    /// twice (zero-sized or not) with [`StorageError::DuplicateComponent`].
    pub fn init(infos: Vec<TypeInfo>, cache_line_bytes: usize) -> Result<Self> {
        let hash = hash_compound_info(&infos);
        let mut tags = HashSet::with_capacity(infos.len());
        let mut column_index = HashMap::with_capacity(infos.len());
        let mut columns = Vec::with_capacity(infos.len());

        for info in &infos {
            if tags.contains(&info.hash) || column_index.contains_key(&info.hash) {
                return Err(StorageError::DuplicateComponent { hash: info.hash });
            }
            if info.is_zero_sized() {
                tags.insert(info.hash);
            } else {
                column_index.insert(info.hash, columns.len());
                columns.push(ErasedColumn::empty(*info));
            }
        }

        Ok(Archetype {
            hash,
            infos,
            tags,
            column_index,
            columns,
            entities: Vec::new(),
            cache_line_bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[u64] {
        &self.entities
    }

    pub fn infos(&self) -> &[TypeInfo] {
        &self.infos
    }

    pub fn has_tag(&self, hash: TypeHash) -> bool {
        self.tags.contains(&hash)
    }

    pub fn column(&self, hash: TypeHash) -> Option<&ErasedColumn> {
        self.column_index.get(&hash).map(|&i| &self.columns[i])
    }

    pub fn column_mut(&mut self, hash: TypeHash) -> Option<&mut ErasedColumn> {
        let idx = *self.column_index.get(&hash)?;
        Some(&mut self.columns[idx])
    }

    /// Appends `entity_id` to the roster and grows every column's
    /// capacity to match the new roster length. Component values are not
    /// written here — the caller populates them through a typed cast of
    /// the relevant column (see SPEC_FULL.md §4.4/§4.5).
    pub fn append_entity(&mut self, alloc: &dyn RawAllocator, entity_id: u64) -> Result<usize> {
        let old_len = self.entities.len();
        let new_len = old_len + 1;
        for column in &mut self.columns {
            column.ensure_total_capacity_with_cache_line(
                alloc,
                new_len,
                old_len,
                self.cache_line_bytes,
            )?;
        }
        self.entities.push(entity_id);
        Ok(old_len)
    }

    /// Runs every column's destructor hook over its live elements and
    /// frees all backing allocations, plus the roster and index maps.
    /// Takes the allocator explicitly because an `Archetype` does not own
    /// one itself — only the owning `World` does (see SPEC_FULL.md §4.4).
    pub fn deinit(&mut self, alloc: &dyn RawAllocator) {
        let len = self.entities.len();
        for column in &mut self.columns {
            column.deinit(alloc, len);
        }
        self.columns.clear();
        self.column_index.clear();
        self.tags.clear();
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{SystemAllocator, DEFAULT_CACHE_LINE_BYTES};
    use crate::hook::Hook;
    use std::alloc::Layout;

    fn info_for<T: 'static>() -> TypeInfo {
        TypeInfo {
            hash: crate::hash::hash_type::<T>(),
            layout: Layout::new::<T>(),
            hook: Hook::default_for::<T>(),
        }
    }

    #[test]
    fn rejects_duplicate_components() {
        let infos = vec![info_for::<u32>(), info_for::<u32>()];
        let result = Archetype::init(infos, DEFAULT_CACHE_LINE_BYTES);
        assert!(matches!(result, Err(StorageError::DuplicateComponent { .. })));
    }

    #[test]
    fn zero_sized_components_become_tags_not_columns() {
        struct Tag;
        let infos = vec![info_for::<Tag>(), info_for::<u32>()];
        let arch = Archetype::init(infos, DEFAULT_CACHE_LINE_BYTES).unwrap();
        assert!(arch.has_tag(crate::hash::hash_type::<Tag>()));
        assert!(arch.column(crate::hash::hash_type::<u32>()).is_some());
        assert!(arch.column(crate::hash::hash_type::<Tag>()).is_none());
    }

    #[test]
    fn append_entity_grows_columns_to_roster_length() {
        let alloc = SystemAllocator;
        let infos = vec![info_for::<u32>()];
        let mut arch = Archetype::init(infos, DEFAULT_CACHE_LINE_BYTES).unwrap();
        arch.append_entity(&alloc, 0).unwrap();
        arch.append_entity(&alloc, 1).unwrap();
        assert_eq!(arch.len(), 2);
        let col = arch.column(crate::hash::hash_type::<u32>()).unwrap();
        assert!(col.capacity() >= 2);
        arch.deinit(&alloc);
    }
}
