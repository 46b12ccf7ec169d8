use super::*;

#[test]
fn shallow_recursion() {
    fn depth_sum(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { n + depth_sum(n - 1) })
    }

    assert_eq!(depth_sum(10), 55);
}

#[test]
fn deep_recursion_does_not_overflow() {
    fn nest(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { nest(n - 1) + 1 })
    }

    assert_eq!(nest(100_000), 100_000);
}

#[test]
fn propagates_errors() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("unbound"));
    assert_eq!(result, Err("unbound"));
}
