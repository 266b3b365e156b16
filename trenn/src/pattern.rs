//! Pattern text compilation.
//!
//! The compiler is a recursive-descent parser over the pattern bytes with a
//! single character of escaping state. Each atom becomes a two-state
//! automaton; groups, alternation and quantifiers combine the pieces through
//! the composition operations of [`crate::nfa`], mirroring Thompson's
//! construction.

use crate::error::PatternError;
use crate::exec::NfaExecutor;
use crate::nfa::{CharClass, Condition, Nfa};

/// Upper bound on group nesting, rejecting pathologically nested patterns.
pub(crate) const MAX_GROUP_DEPTH: usize = 100;

/// A compiled delimiter pattern.
///
/// The compiled graph is immutable; any number of [`NfaExecutor`]s can run
/// against one `Pattern` at the same time.
///
/// # Supported syntax
///
/// * literal bytes; `\` escapes the following byte
/// * `.` matches any byte
/// * `\d \D \w \W \s \S` character classes and their negations
/// * `[..]` bracket sets with literal members and `a-b` ranges, negated by a
///   leading `^`
/// * `(..)` grouping, with at most one `|` per group splitting it into two
///   alternatives
/// * postfix `?`, `*`, `+`, `{m}`, `{m,}` and `{m,max}` applied to the
///   immediately preceding item
#[derive(Clone, Debug)]
pub struct Pattern {
    pub(crate) nfa: Nfa,
}

impl Pattern {
    /// Compiles a pattern, failing with [`PatternError`] if the text is not
    /// well-formed.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut parser = Parser {
            bytes: pattern.as_bytes(),
            pos: 0,
        };
        let nfa = parser.group(0)?;
        Ok(Pattern { nfa })
    }

    /// Creates a fresh executor for this pattern.
    pub fn executor(&self) -> NfaExecutor<'_> {
        NfaExecutor::new(self)
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn bump(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.pos).copied();
        self.pos += (byte.is_some()) as usize;
        byte
    }

    /// Parses a group body: a sequence with at most one top-level `|`,
    /// terminated by `)` when nested or by the end of the pattern at the top
    /// level.
    fn group(&mut self, depth: usize) -> Result<Nfa, PatternError> {
        if depth >= MAX_GROUP_DEPTH {
            return Err(PatternError::NestingTooDeep);
        }
        let mut sequence: Vec<Nfa> = vec![];
        let mut alternative: Option<Nfa> = None;
        let mut escape = false;
        let mut closed = depth == 0;
        while let Some(byte) = self.bump() {
            if byte == b'\\' && !escape {
                escape = true;
                continue;
            }
            if escape {
                sequence.push(escaped_atom(byte));
                escape = false;
                continue;
            }
            match byte {
                b'(' => sequence.push(self.group(depth + 1)?),
                b')' if depth > 0 => {
                    closed = true;
                    break;
                }
                b'|' if depth > 0 => {
                    if alternative.is_some() {
                        return Err(PatternError::ExtraAlternation);
                    }
                    alternative = Some(collapse(std::mem::take(&mut sequence)));
                }
                b'*' => {
                    let last = sequence.pop().ok_or(PatternError::DanglingQuantifier)?;
                    sequence.push(Nfa::star(last));
                }
                b'?' => {
                    let last = sequence.pop().ok_or(PatternError::DanglingQuantifier)?;
                    sequence.push(Nfa::unite(last, Nfa::empty()));
                }
                b'+' => {
                    // One mandatory copy followed by a star over a duplicate.
                    let last = sequence
                        .last()
                        .cloned()
                        .ok_or(PatternError::DanglingQuantifier)?;
                    sequence.push(Nfa::star(last));
                }
                b'{' => {
                    let (min, max) = self.repetition_bounds()?;
                    let last = sequence.pop().ok_or(PatternError::DanglingQuantifier)?;
                    sequence.push(Nfa::repeat(last, min, max));
                }
                b'[' => sequence.push(self.bracket_set()?),
                b'.' => sequence.push(Nfa::atom(Condition::Any)),
                _ => sequence.push(Nfa::atom(Condition::Exact(byte))),
            }
        }
        if !closed {
            return Err(PatternError::UnbalancedGroup);
        }
        let sequence = collapse(sequence);
        Ok(match alternative {
            Some(lhs) => Nfa::unite(lhs, sequence),
            None => sequence,
        })
    }

    /// Parses the inside of `{..}`, the opening brace already consumed.
    /// Returns `(min, max)` with `None` standing for an unbounded maximum.
    fn repetition_bounds(&mut self) -> Result<(usize, Option<usize>), PatternError> {
        let mut min = 0usize;
        let mut max: Option<usize> = None;
        let mut saw_comma = false;
        let mut closed = false;
        let mut first = true;
        while let Some(byte) = self.bump() {
            match byte {
                b',' => {
                    if saw_comma || first {
                        return Err(PatternError::MalformedRepetition);
                    }
                    saw_comma = true;
                }
                b'}' => {
                    if first {
                        return Err(PatternError::MalformedRepetition);
                    }
                    closed = true;
                    break;
                }
                b'0'..=b'9' => {
                    let digit = (byte - b'0') as usize;
                    if saw_comma {
                        max = Some(max.unwrap_or(0).saturating_mul(10).saturating_add(digit));
                    } else {
                        min = min.saturating_mul(10).saturating_add(digit);
                    }
                }
                _ => return Err(PatternError::MalformedRepetition),
            }
            first = false;
        }
        if !closed {
            return Err(PatternError::MalformedRepetition);
        }
        if !saw_comma {
            max = Some(min);
        }
        if matches!(max, Some(max) if max < min) {
            return Err(PatternError::MalformedRepetition);
        }
        Ok((min, max))
    }

    /// Parses the inside of `[..]`, the opening bracket already consumed.
    fn bracket_set(&mut self) -> Result<Nfa, PatternError> {
        let mut ranges: Vec<(u8, u8)> = vec![];
        let mut escape = false;
        let mut prev: Option<u8> = None;
        let mut in_range = false;
        let mut closed = false;
        let mut negate = false;
        let mut first = true;
        while let Some(byte) = self.bump() {
            if byte == b'\\' && !escape {
                escape = true;
                first = false;
                continue;
            }
            if !escape && byte == b'^' {
                if !first {
                    return Err(PatternError::MalformedSet);
                }
                negate = true;
            } else if !escape && byte == b'-' {
                if prev.is_none() {
                    return Err(PatternError::MalformedSet);
                }
                in_range = true;
            } else if !escape && byte == b']' {
                closed = true;
                break;
            } else if in_range {
                let Some(from) = prev.take() else {
                    return Err(PatternError::MalformedSet);
                };
                if byte < from {
                    return Err(PatternError::MalformedSet);
                }
                ranges.push((from, byte));
                in_range = false;
            } else if let Some(member) = prev.replace(byte) {
                ranges.push((member, member));
            }
            escape = false;
            first = false;
        }
        if in_range || !closed {
            return Err(PatternError::MalformedSet);
        }
        if let Some(member) = prev {
            ranges.push((member, member));
        }
        Ok(Nfa::set(&ranges, negate))
    }
}

/// The automaton for an escaped byte: a class for the known class escapes,
/// a literal otherwise.
fn escaped_atom(byte: u8) -> Nfa {
    match byte {
        b'd' => Nfa::class(CharClass::Digit, false),
        b'D' => Nfa::class(CharClass::Digit, true),
        b'w' => Nfa::class(CharClass::Word, false),
        b'W' => Nfa::class(CharClass::Word, true),
        b's' => Nfa::class(CharClass::Space, false),
        b'S' => Nfa::class(CharClass::Space, true),
        _ => Nfa::atom(Condition::Exact(byte)),
    }
}

fn collapse(sequence: Vec<Nfa>) -> Nfa {
    sequence
        .into_iter()
        .reduce(Nfa::concatenate)
        .unwrap_or_else(Nfa::empty)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn compiles(pattern: &str) {
        assert_matches!(Pattern::compile(pattern), Ok(_), "pattern {:?}", pattern);
    }

    fn rejects(pattern: &str, expected: PatternError) {
        assert_eq!(
            Pattern::compile(pattern).err(),
            Some(expected),
            "pattern {:?}",
            pattern
        );
    }

    #[test]
    fn literals_and_groups() {
        compiles("abcdz!!--<>\n\t^^^");
        compiles("abc\\.\\*\\?\\+\\[\\");
        compiles("(abcabc)(cabcab)");
        compiles("(ab(cabc)(ca(bc))ab)");
        rejects("(ab(c)", PatternError::UnbalancedGroup);
    }

    #[test]
    fn postfix_quantifiers() {
        compiles("x?");
        compiles("(xy)?");
        compiles("x.?");
        rejects("?zzz", PatternError::DanglingQuantifier);
        compiles("x*");
        compiles("(xy)*");
        compiles("x.*");
        rejects("*zzz", PatternError::DanglingQuantifier);
        compiles("x+");
        compiles("(xy)+");
        compiles("x.+");
        rejects("+zzz", PatternError::DanglingQuantifier);
    }

    #[test]
    fn repetition_bounds() {
        compiles("x{4}");
        compiles("(xy){4}");
        compiles("x{4,}");
        compiles("(xy){4,}");
        compiles("x{4,30}");
        compiles("(xy){4,30}");
        rejects("x{,5}", PatternError::MalformedRepetition);
        rejects("x{,}", PatternError::MalformedRepetition);
        rejects("x{}", PatternError::MalformedRepetition);
        rejects("x{10,7}", PatternError::MalformedRepetition);
        rejects("x{blah}", PatternError::MalformedRepetition);
        rejects("x{1,7,8,9}", PatternError::MalformedRepetition);
        rejects("x{1,7", PatternError::MalformedRepetition);
        rejects("x{1,", PatternError::MalformedRepetition);
        rejects("x{1", PatternError::MalformedRepetition);
    }

    #[test]
    fn bracket_sets_and_classes() {
        compiles("[a-k7-9%=]");
        compiles("[a\\-*\\][]");
        compiles("\\d\\D\\w\\W\\s\\S");
        compiles("[^a-z678]");
        // Accepted, with empty-set semantics.
        compiles("[]");
        compiles("[^]");
        rejects("[a^b]", PatternError::MalformedSet);
        rejects("[a-b", PatternError::MalformedSet);
        rejects("[a-b-c]", PatternError::MalformedSet);
        rejects("[z-b]", PatternError::MalformedSet);
        rejects("[-z]", PatternError::MalformedSet);
        rejects("[z-]", PatternError::MalformedSet);
    }

    #[test]
    fn alternation_is_two_way_only() {
        compiles("(a|b)");
        compiles("(a|(b|c))");
        rejects("(a|b|c)", PatternError::ExtraAlternation);
    }

    #[test]
    fn stray_closers_are_literals() {
        // Outside a group, `)` and `|` have no special meaning.
        compiles(")");
        compiles("a|b");
    }

    #[test]
    fn nesting_bound() {
        let deep = "(".repeat(150) + &")".repeat(150);
        rejects(&deep, PatternError::NestingTooDeep);
        let shallow = "(".repeat(50) + "x" + &")".repeat(50);
        compiles(&shallow);
    }
}
