//! Shared test-only allocator that counts calls, for the allocation-count
//! and dtor-count properties in SPEC_FULL.md §8.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use ecs_core::alloc::{RawAllocator, SystemAllocator};

#[derive(Default)]
pub struct CountingAllocator {
    inner: SystemAllocator,
    pub alloc_calls: Cell<u32>,
    pub resize_calls: Cell<u32>,
    pub free_calls: Cell<u32>,
}

impl RawAllocator for CountingAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.alloc_calls.set(self.alloc_calls.get() + 1);
        self.inner.alloc(layout)
    }

    fn resize(&self, ptr: NonNull<u8>, old_layout: Layout, new_layout: Layout) -> Option<NonNull<u8>> {
        self.resize_calls.set(self.resize_calls.get() + 1);
        self.inner.resize(ptr, old_layout, new_layout)
    }

    fn remap(&self, ptr: NonNull<u8>, old_layout: Layout, new_layout: Layout) -> Option<()> {
        self.inner.remap(ptr, old_layout, new_layout)
    }

    fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        self.free_calls.set(self.free_calls.get() + 1);
        self.inner.free(ptr, layout);
    }
}
