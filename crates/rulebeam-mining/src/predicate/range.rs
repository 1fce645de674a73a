//! Convenience constructors for ordered-value predicates.

use std::fmt::Display;

use super::Predicate;

/// Half-open interval predicate `[lo;hi)`, named after its bounds.
pub fn range<T>(lo: T, hi: T) -> Predicate<T>
where
    T: PartialOrd + Display + Send + Sync + 'static,
{
    let name = format!("[{lo};{hi})");
    Predicate::atomic(name, move |x: &T| *x >= lo && *x < hi)
}

/// Contiguous ranges of equal `width` covering `[start;end)`; the last
/// range is truncated at `end`.
pub fn ranges(start: i64, end: i64, width: i64) -> Vec<Predicate<i64>> {
    if width <= 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut lo = start;
    while lo < end {
        let hi = (lo + width).min(end);
        out.push(range(lo, hi));
        lo = hi;
    }
    out
}
