//! Stack safety for deep recursion.
//!
//! Class trees, method bodies and attribute initializers are all walked
//! recursively by the code generator. A deeply nested expression (a long
//! chain of `let`s or a generated block of thousands of additions) would
//! otherwise overflow the native stack, so every recursive entry point
//! wraps itself in [`ensure_sufficient_stack`].
//!
//! - **Native targets**: grows the stack on demand via `stacker`.
//! - **WASM targets**: plain passthrough.

/// Remaining stack below which we grow (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn lower(&mut self, id: ExprId) -> Result<Operand, CodegenError> {
///     ensure_sufficient_stack(|| self.lower_inner(id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
