//! `TypedColumn<T>`: a growable buffer of `T` with externally-tracked
//! length.
//!
//! The column itself does not know how many elements are live — only how
//! many it has room for. An archetype holds one `len` shared by every
//! column belonging to it. This mirrors the distilled-from-Zig vocabulary
//! (`ensure_total_capacity`, `add_one`, `swap_remove`) named in
//! `examples/original_source/_INDEX.md`'s source lineage, ported to a
//! Rust `TypedColumn<T>` rather than an unmanaged `ArrayList(T)`.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::alloc::{grow_capacity_with_cache_line, RawAllocator, DEFAULT_CACHE_LINE_BYTES};
use crate::error::{Result, StorageError};
use crate::erased_column::ErasedColumn;
use crate::type_info::TypeInfo;

/// A contiguous, growable array of `T` that does not track its own
/// length. Zero-sized `T` never allocates; `capacity()` reports
/// `usize::MAX` for it.
pub struct TypedColumn<T> {
    base: NonNull<T>,
    capacity: usize,
    _marker: PhantomData<T>,
}

// SAFETY: a `TypedColumn<T>` owns its buffer exclusively; it is `Send`/`Sync`
// exactly when `T` is, matching `Vec<T>`.
unsafe impl<T: Send> Send for TypedColumn<T> {}
unsafe impl<T: Sync> Sync for TypedColumn<T> {}

impl<T> TypedColumn<T> {
    pub fn empty() -> Self {
        if std::mem::size_of::<T>() == 0 {
            return TypedColumn {
                base: NonNull::dangling(),
                capacity: usize::MAX,
                _marker: PhantomData,
            };
        }
        TypedColumn {
            base: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_zst() -> bool {
        std::mem::size_of::<T>() == 0
    }

    fn layout_for(capacity: usize) -> Layout {
        Layout::array::<T>(capacity).expect("capacity overflow")
    }

    /// Ensures room for at least `new_cap` elements, growing via
    /// [`crate::alloc::grow_capacity`] when the requested capacity exceeds
    /// the current one. `len` is the number of elements presently live
    /// (needed to know how much to copy on reallocation).
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
        if Self::is_zst() || new_cap <= self.capacity {
            return Ok(());
        }
        let grown = grow_capacity_with_cache_line(
            std::mem::size_of::<T>(),
            self.capacity,
            new_cap,
            cache_line_bytes,
        );
        self.ensure_total_capacity_precise(alloc, grown, len)
    }

    /// Grows (or shrinks) to exactly `new_cap`, without applying the
    /// growth policy. Attempts an in-place remap first; falls back to a
    /// fresh allocation plus copy of the first `len` elements.
    pub fn ensure_total_capacity_precise(
        &mut self,
        alloc: &dyn RawAllocator,
        new_cap: usize,
        len: usize,
    ) -> Result<()> {
        if Self::is_zst() || new_cap <= self.capacity {
            return Ok(());
        }
        let new_layout = Self::layout_for(new_cap);
        if self.capacity == 0 {
            let ptr = alloc
                .alloc(new_layout)
                .ok_or(StorageError::OutOfMemory {
                    requested: new_layout.size(),
                })?;
            self.base = ptr.cast();
            self.capacity = new_cap;
            return Ok(());
        }
        let old_layout = Self::layout_for(self.capacity);
        let old_ptr = self.base.cast::<u8>();
        if alloc.remap(old_ptr, old_layout, new_layout).is_some() {
            self.capacity = new_cap;
            return Ok(());
        }
        let new_ptr = alloc
            .alloc(new_layout)
            .ok_or(StorageError::OutOfMemory {
                requested: new_layout.size(),
            })?;
        unsafe {
            std::ptr::copy_nonoverlapping(self.base.as_ptr(), new_ptr.as_ptr().cast(), len);
        }
        alloc.free(old_ptr, old_layout);
        self.base = new_ptr.cast();
        self.capacity = new_cap;
        Ok(())
    }

    /// Appends `item` at index `len`, growing if necessary, and returns
    /// the new length.
    pub fn append(&mut self, alloc: &dyn RawAllocator, item: T, len: usize) -> Result<usize> {
        self.ensure_total_capacity(alloc, len + 1, len)?;
        unsafe {
            self.base.as_ptr().add(len).write(item);
        }
        Ok(len + 1)
    }

    /// Grows if necessary and returns a pointer to the (uninitialized)
    /// slot at index `len` for the caller to write into. The pointer is
    /// invalidated by any subsequent call that may reallocate.
    pub fn add_one(&mut self, alloc: &dyn RawAllocator, len: usize) -> Result<*mut T> {
        self.ensure_total_capacity(alloc, len + 1, len)?;
        Ok(unsafe { self.base.as_ptr().add(len) })
    }

    /// Removes and returns the last element, or `None` if `len == 0`.
    pub fn pop(&mut self, len: usize) -> Option<T> {
        if len == 0 {
            return None;
        }
        Some(unsafe { self.base.as_ptr().add(len - 1).read() })
    }

    /// Removes index `i` (asserting `i < len`) in O(1) by moving the last
    /// element into its place; equivalent to [`Self::pop`] when
    /// `i == len - 1`.
    pub fn swap_remove(&mut self, i: usize, len: usize) -> T {
        assert!(i < len, "swap_remove index {i} out of bounds for len {len}");
        let last = len - 1;
        let removed = unsafe { self.base.as_ptr().add(i).read() };
        if i != last {
            let moved = unsafe { self.base.as_ptr().add(last).read() };
            unsafe { self.base.as_ptr().add(i).write(moved) };
        }
        removed
    }

    /// Adopts a caller-owned buffer as this column's storage; the new
    /// capacity is `items.len()`. The elements are moved in; `items`'
    /// original allocation is released without running `T`'s destructor
    /// (ownership of the values transfers to the column).
    pub fn from_owned(items: Vec<T>) -> Self {
        if Self::is_zst() {
            std::mem::forget(items);
            return TypedColumn {
                base: NonNull::dangling(),
                capacity: usize::MAX,
                _marker: PhantomData,
            };
        }
        let mut items = std::mem::ManuallyDrop::new(items);
        let capacity = items.len();
        let ptr = NonNull::new(items.as_mut_ptr()).unwrap_or(NonNull::dangling());
        TypedColumn {
            base: ptr,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Reseats this column's buffer behind an erased view described by
    /// `info`. Resets `self` to empty (capacity 0) so the buffer is not
    /// freed twice.
    pub fn to_erased(&mut self, info: TypeInfo) -> ErasedColumn {
        debug_assert_eq!(info.layout.size(), std::mem::size_of::<T>());
        debug_assert_eq!(info.layout.align(), std::mem::align_of::<T>());
        let capacity = self.capacity;
        let base = self.base.cast::<u8>();
        *self = if Self::is_zst() {
            TypedColumn {
                base: NonNull::dangling(),
                capacity: usize::MAX,
                _marker: PhantomData,
            }
        } else {
            TypedColumn {
                base: NonNull::dangling(),
                capacity: 0,
                _marker: PhantomData,
            }
        };
        unsafe { ErasedColumn::from_raw_parts(base, capacity, info) }
    }

    /// # Safety
    /// `i` must be within the live length tracked externally by the
    /// caller.
    pub unsafe fn get(&self, i: usize) -> &T {
        unsafe { &*self.base.as_ptr().add(i) }
    }

    /// # Safety
    /// `i` must be within the live length tracked externally by the
    /// caller.
    pub unsafe fn get_mut(&mut self, i: usize) -> &mut T {
        unsafe { &mut *self.base.as_ptr().add(i) }
    }

    /// Frees the backing allocation without running destructors on any
    /// live elements. Callers must drop (or have already moved out) the
    /// first `len` elements before calling this.
    pub fn deinit(&mut self, alloc: &dyn RawAllocator, _len: usize) {
        if Self::is_zst() || self.capacity == 0 {
            return;
        }
        let layout = Self::layout_for(self.capacity);
        alloc.free(self.base.cast(), layout);
        self.capacity = 0;
        self.base = NonNull::dangling();
    }
}
