//! This crate provides a single-owner heap pointer and the helpers around it.
//!
//! **ExclusiveOwner**
//!
//! [`ExclusiveOwner<T, D>`] owns zero or one heap instance and tears it down
//! through its [`Deleter`] exactly once. It is move-only: it cannot be cloned,
//! [`take`](ExclusiveOwner::take) moves the instance out of a place and leaves
//! it empty, and [`assign`](ExclusiveOwner::assign) tears down the old
//! instance before adopting a new one.
//!
//! `ExclusiveOwner<[E]>` is the array form, with indexing instead of a single
//! dereference.
//!
//! **Deleter**
//!
//! [`DefaultDelete`] frees the instance like `Box` does. Any
//! `FnMut(NonNull<T>)` closure can be used instead, to close handles or
//! recycle storage.
//!
//! **ScopeGuard**
//!
//! [`make_raii`] guards a borrowed resource with a closer that runs when the
//! guard leaves scope. Use it when the resource lives elsewhere and only its
//! cleanup needs to be scoped.
//!
//! # Features
//!
//! - `std`: links the standard library.
//! - `debug`: counts owners holding an instance, see [`debug::live_owners`].
//! - `serde`: owners (de)serialize as `Option<T>`.
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod deleter;
mod error;
mod owner;
mod raw;
mod scope_guard;
mod slice;

#[cfg(feature = "serde")]
mod serde;

pub mod debug;

// -----------------------------------------------------------------------------
// Top-level exports

pub use deleter::{DefaultDelete, Deleter};
pub use error::{AllocError, ConstructError};
pub use owner::{ExclusiveOwner, make_exclusive};
pub use scope_guard::{ScopeGuard, make_raii};
