// Modules
pub mod data;
pub mod distance;
pub mod eval;
pub mod prelude;
pub mod report;
pub mod utils;

#[cfg(test)]
#[macro_export]
macro_rules! assert_float_eq {
    ($lhs: expr, $rhs: expr) => {
        let (a, b): (f64, f64) = ($lhs, $rhs);
        assert!((a - b).abs() < 1e-9, "{a} != {b}")
    };
    ($lhs: expr, $rhs: expr, $tol: expr) => {
        let (a, b): (f64, f64) = ($lhs, $rhs);
        assert!((a - b).abs() < $tol, "{a} != {b} (tol {})", $tol)
    };
}
