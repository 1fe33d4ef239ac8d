//! Inline-capacity containers.
//!
//! Worker-local bookkeeping (ready fibers, queued work) grows and shrinks in
//! small bursts. Paying a heap allocation for every mutation would dominate
//! scheduling overhead, so the containers in this module keep small element
//! counts in inline storage and only touch the heap once they outgrow it.

mod inline_vec;

pub use inline_vec::InlineVec;
