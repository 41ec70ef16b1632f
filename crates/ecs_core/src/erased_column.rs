//! `ErasedColumn`: a growable, type-erased buffer described by a
//! [`TypeInfo`], used once a column's element type is no longer known at
//! compile time.
//!
//! Grounded on `bruno1308-nomai-engine/crates/nomai-ecs/src/archetype.rs`'s
//! `Column { data, len, capacity, item_size, item_align }`: its
//! `swap_remove_and_move` (copy out without dropping) is the exact shape
//! required by the no-dtor-on-overwritten-slot invariant below.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::alloc::{grow_capacity_with_cache_line, RawAllocator, DEFAULT_CACHE_LINE_BYTES};
use crate::error::{Result, StorageError};
use crate::type_info::TypeInfo;

/// A contiguous, growable, type-erased array. Length is tracked
/// externally by the owning archetype, exactly like [`crate::column::TypedColumn`].
pub struct ErasedColumn {
    base: NonNull<u8>,
    capacity: usize,
    info: TypeInfo,
}

impl ErasedColumn {
    /// An empty column described by `info`. Allocates nothing.
    pub fn empty(info: TypeInfo) -> Self {
        let capacity = if info.is_zero_sized() { usize::MAX } else { 0 };
        ErasedColumn {
            base: NonNull::dangling(),
            capacity,
            info,
        }
    }

    /// # Safety
    /// `base`/`capacity` must describe a buffer allocated with
    /// `info.layout.repeat(capacity)` (or be the dangling/0-capacity
    /// sentinel), matching `info`'s stride.
    pub unsafe fn from_raw_parts(base: NonNull<u8>, capacity: usize, info: TypeInfo) -> Self {
        ErasedColumn { base, capacity, info }
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn stride(&self) -> usize {
        self.info.stride()
    }

    fn is_zst(&self) -> bool {
        self.info.is_zero_sized()
    }

    fn layout_for(&self, capacity: usize) -> Layout {
        let stride = self.stride();
        Layout::from_size_align(stride * capacity, self.info.layout.align())
            .expect("capacity overflow")
    }

    unsafe fn slot(&self, i: usize) -> *mut u8 {
        unsafe { self.base.as_ptr().add(i * self.stride()) }
    }

    pub fn ensure_total_capacity(
        &mut self,
        alloc: &dyn RawAllocator,
        new_cap: usize,
        len: usize,
    ) -> Result<()> {
        self.ensure_total_capacity_with_cache_line(alloc, new_cap, len, DEFAULT_CACHE_LINE_BYTES)
    }

    pub fn ensure_total_capacity_with_cache_line(
        &mut self,
        alloc: &dyn RawAllocator,
        new_cap: usize,
        len: usize,
        cache_line_bytes: usize,
    ) -> Result<()> {
        if self.is_zst() || new_cap <= self.capacity {
            return Ok(());
        }
        let grown = grow_capacity_with_cache_line(self.stride(), self.capacity, new_cap, cache_line_bytes);
        self.ensure_total_capacity_precise(alloc, grown, len)
    }

    pub fn ensure_total_capacity_precise(
        &mut self,
        alloc: &dyn RawAllocator,
        new_cap: usize,
        len: usize,
    ) -> Result<()> {
        if self.is_zst() || new_cap <= self.capacity {
            return Ok(());
        }
        let new_layout = self.layout_for(new_cap);
        if self.capacity == 0 {
            let ptr = alloc.alloc(new_layout).ok_or(StorageError::OutOfMemory {
                requested: new_layout.size(),
            })?;
            self.base = ptr;
            self.capacity = new_cap;
            return Ok(());
        }
        let old_layout = self.layout_for(self.capacity);
        if alloc.remap(self.base, old_layout, new_layout).is_some() {
            self.capacity = new_cap;
            return Ok(());
        }
        let new_ptr = alloc.alloc(new_layout).ok_or(StorageError::OutOfMemory {
            requested: new_layout.size(),
        })?;
        let copy_bytes = self.stride() * len;
        unsafe {
            std::ptr::copy_nonoverlapping(self.base.as_ptr(), new_ptr.as_ptr(), copy_bytes);
        }
        alloc.free(self.base, old_layout);
        self.base = new_ptr;
        self.capacity = new_cap;
        Ok(())
    }

    /// Writes `len`'s worth of raw bytes (exactly `stride` bytes) into
    /// slot `len`, growing first. Does not run the copy hook; `src` is
    /// treated as a value being moved in.
    pub fn push_raw(&mut self, alloc: &dyn RawAllocator, src: *const u8, len: usize) -> Result<()> {
        self.ensure_total_capacity(alloc, len + 1, len)?;
        if !self.is_zst() {
            let dst = unsafe { self.slot(len) };
            unsafe { std::ptr::copy_nonoverlapping(src, dst, self.info.layout.size()) };
        }
        Ok(())
    }

    /// Copies the element at `len - 1` into `dst` (exactly
    /// `info.layout.size()` bytes) and returns `true`; returns `false`
    /// without touching `dst` if `len == 0`. Does not run the destructor
    /// hook — ownership of the bytes moves to the caller.
    pub fn pop(&mut self, dst: *mut u8, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        if !self.is_zst() {
            let src = unsafe { self.slot(len - 1) };
            unsafe { std::ptr::copy_nonoverlapping(src, dst, self.info.layout.size()) };
        }
        true
    }

    /// Copies element `i` into `dst`, then overwrites slot `i` with the
    /// bytes of element `len - 1` (no-op when `i == len - 1`). Does not
    /// run the destructor hook on the overwritten slot: its value has
    /// already been moved into `dst`.
    pub fn swap_remove(&mut self, dst: *mut u8, i: usize, len: usize) {
        assert!(i < len, "swap_remove index {i} out of bounds for len {len}");
        if self.is_zst() {
            return;
        }
        let size = self.info.layout.size();
        let src = unsafe { self.slot(i) };
        unsafe { std::ptr::copy_nonoverlapping(src, dst, size) };
        let last = len - 1;
        if i != last {
            let moved = unsafe { self.slot(last) };
            unsafe { std::ptr::copy_nonoverlapping(moved, src, size) };
        }
    }

    /// Runs the destructor hook on each of the first `len` live elements,
    /// then frees the backing allocation.
    pub fn deinit(&mut self, alloc: &dyn RawAllocator, len: usize) {
        if !self.is_zst() {
            for i in 0..len {
                let ptr = unsafe { self.slot(i) };
                unsafe { self.info.hook.run_dtor(ptr, alloc) };
            }
            if self.capacity > 0 {
                let layout = self.layout_for(self.capacity);
                alloc.free(self.base, layout);
            }
        }
        self.capacity = if self.is_zst() { usize::MAX } else { 0 };
        self.base = NonNull::dangling();
    }

    /// Adopts a byte buffer whose length is an exact multiple of
    /// `info.stride()`: allocates a fresh buffer through `alloc` (so
    /// `deinit` later frees it with a layout that actually matches the
    /// allocation) and copies `bytes` in, the same allocate-then-copy
    /// shape `ensure_total_capacity_precise` uses for its reallocation
    /// path. Trailing bytes past the last whole element are dropped.
    pub fn from_erased_slice(alloc: &dyn RawAllocator, bytes: &[u8], info: TypeInfo) -> Result<Self> {
        if info.is_zero_sized() {
            return Ok(ErasedColumn {
                base: NonNull::dangling(),
                capacity: usize::MAX,
                info,
            });
        }
        let mut column = ErasedColumn::empty(info);
        let capacity = bytes.len() / column.stride();
        if capacity == 0 {
            return Ok(column);
        }
        let layout = column.layout_for(capacity);
        let ptr = alloc.alloc(layout).ok_or(StorageError::OutOfMemory {
            requested: layout.size(),
        })?;
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), column.stride() * capacity);
        }
        column.base = ptr;
        column.capacity = capacity;
        Ok(column)
    }

    /// Adopts a caller-owned `Vec<T>` as an erased column described by
    /// `info` (which must match `T`'s layout): allocates through `alloc`
    /// and byte-copies the elements in by value (ownership transfers to
    /// the column, mirroring [`crate::column::TypedColumn::from_owned`]),
    /// then releases the `Vec`'s own buffer through the global allocator
    /// it was allocated with, reconstructed at length `0` so `T::drop`
    /// does not run a second time over values already moved into the
    /// column. Bridges tests and typed-to-erased conversion; never used
    /// to forge a mismatched `TypeInfo` — see SPEC_FULL.md §4.3.
    ///
    /// # Panics
    /// If `info`'s layout does not match `T`'s.
    pub fn from_owned<T: 'static>(alloc: &dyn RawAllocator, items: Vec<T>, info: TypeInfo) -> Result<Self> {
        assert_eq!(info.layout.size(), std::mem::size_of::<T>(), "TypeInfo/T layout mismatch");
        assert_eq!(info.layout.align(), std::mem::align_of::<T>(), "TypeInfo/T layout mismatch");
        let mut items = std::mem::ManuallyDrop::new(items);
        let len = items.len();
        let src_cap = items.capacity();
        let src_ptr = items.as_mut_ptr();

        let result = if info.is_zero_sized() {
            Ok(ErasedColumn {
                base: NonNull::dangling(),
                capacity: usize::MAX,
                info,
            })
        } else if len == 0 {
            Ok(ErasedColumn::empty(info))
        } else {
            let mut column = ErasedColumn::empty(info);
            let layout = column.layout_for(len);
            match alloc.alloc(layout) {
                Some(ptr) => {
                    unsafe {
                        std::ptr::copy_nonoverlapping(src_ptr.cast::<u8>(), ptr.as_ptr(), layout.size());
                    }
                    column.base = ptr;
                    column.capacity = len;
                    Ok(column)
                }
                None => Err(StorageError::OutOfMemory {
                    requested: layout.size(),
                }),
            }
        };

        // The source `Vec<T>`'s elements are either already byte-copied
        // (success) or untouched (failure); either way free its buffer
        // without re-running `T::drop` by reconstructing it at length 0.
        unsafe {
            drop(Vec::from_raw_parts(src_ptr, 0, src_cap));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SystemAllocator;
    use crate::hook::Hook;
    use std::alloc::Layout as StdLayout;

    fn info_for<T: 'static>() -> TypeInfo {
        TypeInfo {
            hash: crate::hash::hash_type::<T>(),
            layout: StdLayout::new::<T>(),
            hook: Hook::default_for::<T>(),
        }
    }

    #[test]
    fn push_and_pop_round_trip() {
        let alloc = SystemAllocator;
        let info = info_for::<u32>();
        let mut col = ErasedColumn::empty(info);
        let value = 42u32;
        col.push_raw(&alloc, &value as *const u32 as *const u8, 0)
            .unwrap();
        let mut out: u32 = 0;
        let popped = col.pop(&mut out as *mut u32 as *mut u8, 1);
        assert!(popped);
        assert_eq!(out, 42);
        col.deinit(&alloc, 0);
    }

    #[test]
    fn dtor_runs_once_per_live_element() {
        use std::cell::Cell;
        thread_local! {
            static COUNT: Cell<u32> = Cell::new(0);
        }
        struct Counted(u32);
        impl Drop for Counted {
            fn drop(&mut self) {
                COUNT.with(|c| c.set(c.get() + 1));
            }
        }
        let alloc = SystemAllocator;
        let info = info_for::<Counted>();
        let mut col = ErasedColumn::empty(info);
        let mut len = 0;
        for v in [Counted(1), Counted(2)] {
            let v = std::mem::ManuallyDrop::new(v);
            col.push_raw(&alloc, &*v as *const Counted as *const u8, len)
                .unwrap();
            len += 1;
        }
        col.deinit(&alloc, len);
        assert_eq!(COUNT.with(|c| c.get()), 2);
    }

    #[test]
    fn swap_remove_moves_last_element_into_hole() {
        let alloc = SystemAllocator;
        let info = info_for::<u32>();
        let mut col = ErasedColumn::empty(info);
        let mut len = 0;
        for v in [10u32, 20, 30] {
            col.push_raw(&alloc, &v as *const u32 as *const u8, len).unwrap();
            len += 1;
        }
        let mut removed: u32 = 0;
        col.swap_remove(&mut removed as *mut u32 as *mut u8, 0, len);
        len -= 1;
        assert_eq!(removed, 10);
        let mut first: u32 = 0;
        col.pop(&mut first as *mut u32 as *mut u8, len);
        // pop reads the last live slot (index 1, originally 20); index 0
        // now holds the swapped-in 30.
        assert_eq!(first, 20);
        let mut new_first: u32 = 0;
        let src = unsafe { col.slot(0) };
        let stride = col.stride();
        unsafe { std::ptr::copy_nonoverlapping(src, &mut new_first as *mut u32 as *mut u8, stride) };
        assert_eq!(new_first, 30);
        col.deinit(&alloc, 1);
    }

    #[test]
    fn erase_then_pop_round_trips_the_value() {
        // Scenario 4: append to a TypedColumn<u32>, erase it, then pop
        // from the erased column.
        let alloc = SystemAllocator;
        let world = crate::world::World::init(Box::new(SystemAllocator));
        let mut typed: crate::column::TypedColumn<u32> = crate::column::TypedColumn::empty();
        let mut len = typed.append(&alloc, 42u32, 0).unwrap();
        let info = TypeInfo::of::<u32>(&world);
        let mut erased = typed.to_erased(info);
        let mut out: u32 = 0;
        let popped = erased.pop(&mut out as *mut u32 as *mut u8, len);
        assert!(popped);
        assert_eq!(out, 42);
        len -= 1;
        erased.deinit(&alloc, len);
    }

    #[test]
    fn from_erased_slice_adopts_whole_elements_and_drops_trailing_bytes() {
        let alloc = SystemAllocator;
        let info = info_for::<u32>();
        let bytes = 7u32.to_ne_bytes().iter().chain(&[0xffu8]).copied().collect::<Vec<u8>>();
        let mut col = ErasedColumn::from_erased_slice(&alloc, &bytes, info).unwrap();
        assert_eq!(col.capacity(), 1);
        let mut out: u32 = 0;
        assert!(col.pop(&mut out as *mut u32 as *mut u8, 1));
        assert_eq!(out, 7);
        col.deinit(&alloc, 0);
    }

    #[test]
    fn from_owned_adopts_vec_and_frees_source_buffer_on_deinit() {
        let alloc = SystemAllocator;
        let info = info_for::<u32>();
        let mut col = ErasedColumn::from_owned(&alloc, vec![1u32, 2, 3], info).unwrap();
        assert_eq!(col.capacity(), 3);
        let mut out: u32 = 0;
        assert!(col.pop(&mut out as *mut u32 as *mut u8, 3));
        assert_eq!(out, 3);
        col.deinit(&alloc, 2);
    }
}
