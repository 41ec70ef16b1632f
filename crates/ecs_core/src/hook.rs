//! Per-type destructor/copy callbacks for erased values.
//!
//! Mirrors `bruno1308-nomai-engine`'s `ComponentVtable { drop_fn, clone_fn,
//! .. }`, but stored *by value* inside `TypeInfo` rather than behind a
//! reference into the world's hook table — see SPEC_FULL.md §9's
//! hook-representation Open Question for why.
//!
//! Both callbacks take the owning `RawAllocator` as SPEC_FULL.md §3
//! specifies (`dtor(ptr, allocator)`, `copy(dst, src, byte_len,
//! allocator)`): a component's drop glue may itself need to free a nested
//! allocation through the same allocator the column used.

use crate::alloc::RawAllocator;

/// A pair of type-erased callbacks: one to drop a value in place, one to
/// byte-copy a value from one slot to another. Both are plain function
/// pointers, so `Hook` is `Copy` and carries no lifetime.
#[derive(Clone, Copy)]
pub struct Hook {
    pub(crate) dtor: unsafe fn(*mut u8, &dyn RawAllocator),
    pub(crate) copy: unsafe fn(dst: *mut u8, src: *const u8, len: usize, alloc: &dyn RawAllocator),
}

impl Hook {
    /// Builds the real drop-glue/memcpy pair for `T`.
    pub fn default_for<T: 'static>() -> Self {
        Hook {
            dtor: drop_in_place::<T>,
            copy: memcpy_raw,
        }
    }

    /// A hook whose destructor and copy are both no-ops; useful for
    /// components that are `Copy` and need no special handling.
    pub fn noop() -> Self {
        Hook {
            dtor: noop_dtor,
            copy: memcpy_raw,
        }
    }

    /// # Safety
    /// `ptr` must point to a valid, initialized `T` (as resolved when this
    /// hook was created) that has not already been dropped.
    pub unsafe fn run_dtor(&self, ptr: *mut u8, alloc: &dyn RawAllocator) {
        unsafe { (self.dtor)(ptr, alloc) }
    }

    /// # Safety
    /// `dst`/`src` must be valid for `len` bytes and non-overlapping.
    pub unsafe fn run_copy(&self, dst: *mut u8, src: *const u8, len: usize, alloc: &dyn RawAllocator) {
        unsafe { (self.copy)(dst, src, len, alloc) }
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}

unsafe fn drop_in_place<T>(ptr: *mut u8, _alloc: &dyn RawAllocator) {
    unsafe { std::ptr::drop_in_place(ptr as *mut T) };
}

unsafe fn noop_dtor(_ptr: *mut u8, _alloc: &dyn RawAllocator) {}

unsafe fn memcpy_raw(dst: *mut u8, src: *const u8, len: usize, _alloc: &dyn RawAllocator) {
    unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
}
