// SPDX-License-Identifier: GPL-3.0-or-later

//! # Arbor Tuple
//!
//! The canonical fixed-arity compound object for a runtime built on
//! [`arbor_core`]: a tuple of trivial words and managed references,
//! with an [`arbor_core::ObjectOps`] implementation so the collector
//! can trace through it like any other nontrivial object.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

mod tuple;

pub use arbor_core::{Gc, HeaderId};
pub use tuple::{alloc_tuple, get_tuple_at, set_tuple_at, tuple_len, TupleOps, TupleValue, MAX_ARITY, TUPLE_OPS};
