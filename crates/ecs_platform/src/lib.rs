//! Platform probing for the storage core.
//!
//! The archetype column growth policy seeds its initial capacity from the
//! host's cache line size (see `ecs_core::alloc::grow_capacity`). This crate
//! is the only place that reaches outside Rust's standard library to find
//! that number; everything else in the workspace treats it as a plain
//! `usize` handed in through configuration.

pub mod memory;

pub use memory::Memory;
