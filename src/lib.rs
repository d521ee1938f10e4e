//! Host-side array engine for a real-time fluid-simulation viewer.
//!
//! The numerical kernel of the simulation lives in GPU shaders; this crate
//! is the host's description of the data that flows to and from it. Two
//! storage strategies sit behind the one generic [`Array`] facade:
//! compile-time-shaped stack buffers ([`Const`] dimensions) and
//! runtime-shaped heap buffers ([`Dyn`] dimensions). The facade provides
//! elementwise arithmetic, comparisons, reductions, and iteration, with
//! Python-style wraparound indexing throughout.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod array;
mod dim;
mod error;
mod fields;
mod index;
mod utils;

pub use array::*;
pub use dim::*;
pub use error::*;
pub use fields::*;
pub use index::*;
