//! Stack growth for deeply nested source.
//!
//! Expressions, declarators and blocks are parsed by recursion on the call
//! stack. Each recursive entry point goes through [`ensure_sufficient_stack`],
//! which moves onto a freshly allocated segment when the current one runs low.

/// Grow when less than this remains
const RED_ZONE: usize = 128 * 1024;

/// Size of each new segment
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }
}
