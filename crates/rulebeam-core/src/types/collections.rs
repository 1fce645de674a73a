//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec for predicate operand lists (usually <4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// SmallVec for combinator choices (AND / OR).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
