//! The property store: a small, focused subsystem in its own crate rather
//! than folded into the main orchestration library.

mod store;

pub use store::PropertyStore;
