use thiserror::Error;

use crate::pattern::MAX_GROUP_DEPTH;

/// Error returned when a pattern is structurally malformed.
///
/// Compilation fails synchronously and produces no automaton; the pattern
/// text has to be fixed before retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// A `(` without a matching `)`.
    #[error("unbalanced group delimiters")]
    UnbalancedGroup,
    /// A group with more than one `|` at its top nesting level.
    #[error("a group may contain only one top-level `|`")]
    ExtraAlternation,
    /// A quantifier (`?`, `*`, `+` or `{..}`) with nothing in front of it.
    #[error("quantifier without a preceding item")]
    DanglingQuantifier,
    /// Bad `{..}` bounds: empty, non-numeric, unterminated or reversed.
    #[error("malformed repetition bounds")]
    MalformedRepetition,
    /// Bad `[..]` expression: unterminated, dangling `-`, misplaced `^` or a
    /// reversed range.
    #[error("malformed bracket set")]
    MalformedSet,
    /// Groups nested deeper than the fixed recursion bound.
    #[error("group nesting deeper than {MAX_GROUP_DEPTH} levels")]
    NestingTooDeep,
}
