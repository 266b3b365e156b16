//! Trenn is a small regex engine built for greedy, incremental matching of
//! delimiter patterns in byte streams.
//!
//! Unlike a general-purpose regex crate, Trenn is fed one byte at a time and
//! can be queried after every byte: does the input consumed so far match the
//! pattern, could it still become a match, or is it beyond repair? This is
//! the shape of question a streaming tokenizer has to ask while it decides
//! where a separator or delimiter ends, without being allowed to look at the
//! input as a whole.
//!
//! The engine has two halves:
//!
//! * [`Pattern`] compiles a restricted regex syntax (literals, escapes,
//!   character classes, bracket sets, two-way alternation, bounded and
//!   unbounded repetition, `.`) into an immutable automaton graph.
//! * [`NfaExecutor`] simulates that graph against an incoming byte sequence,
//!   keeping every live partial-match candidate alive at once, and reports
//!   the current [`MatchStatus`] as well as the length of the longest match
//!   seen so far.
//!
//! A compiled [`Pattern`] is never mutated, so any number of executors can
//! share one.
//!
//! Trenn deliberately does not provide capture groups, backreferences or
//! Unicode semantics; it operates on the byte alphabet. The streaming
//! operations built on top of this engine live in the `trenn-stream` crate.

#![warn(missing_docs)]
mod error;
mod exec;
mod nfa;
mod pattern;

pub use error::PatternError;
pub use exec::NfaExecutor;
pub use nfa::MatchStatus;
pub use pattern::Pattern;
