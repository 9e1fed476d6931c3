//! Stack growth for the recursive passes.
//!
//! Parsing, resolution, evaluation and printing all recurse once per nesting
//! level of the program (and evaluation once per Lox call).  Wrapping those
//! entry points in [`ensure_sufficient_stack`] moves deep recursion onto
//! heap-allocated stack segments instead of overflowing the thread stack.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
