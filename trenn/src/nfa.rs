//! The automaton graph and its composition operations.
//!
//! An [`Nfa`] is an arena of states addressed by index. All edges are stored
//! as signed offsets relative to the state they start from, which lets
//! complete sub-automata be concatenated, embedded or duplicated as opaque
//! contiguous blocks: composing two graphs only ever patches states adjacent
//! to the seam, never the interior of either side. State 0 is the entry
//! point of a complete graph.

/// Verdict about the input consumed so far.
///
/// Used both as the per-state match classification of the automaton and as
/// the aggregate status of an [`executor`](crate::NfaExecutor). The variants
/// are ordered: the aggregate status over a set of live candidates is the
/// minimum of their per-state classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStatus {
    /// The input consumed so far is a complete match.
    Accept,
    /// Not a match yet, but consuming more input may produce one.
    Unsure,
    /// No continuation of the input can ever match.
    Refuse,
}

/// One of the POSIX-ish classes reachable through `\d`, `\w`, `\s` and
/// their negations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CharClass {
    /// Alphanumeric or `_`.
    Word,
    /// ASCII decimal digit.
    Digit,
    /// ASCII whitespace, including vertical tab.
    Space,
    /// ASCII punctuation. No escape produces this class.
    #[allow(dead_code)]
    Punct,
}

impl CharClass {
    pub(crate) fn contains(self, symbol: u8) -> bool {
        match self {
            CharClass::Word => symbol.is_ascii_alphanumeric() || symbol == b'_',
            CharClass::Digit => symbol.is_ascii_digit(),
            CharClass::Space => symbol.is_ascii_whitespace() || symbol == 0x0b,
            CharClass::Punct => symbol.is_ascii_punctuation(),
        }
    }
}

/// Predicate deciding whether a symbol may take a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Condition {
    Exact(u8),
    NotExact(u8),
    InRange(u8, u8),
    NotInRange(u8, u8),
    /// Negation of a whole multi-range set. A negated bracket set with more
    /// than one member cannot be split into independent per-range
    /// transitions, as any symbol would pass all but one of them.
    NotInSet(Box<[(u8, u8)]>),
    InClass(CharClass),
    NotInClass(CharClass),
    Any,
}

impl Condition {
    pub(crate) fn matches(&self, symbol: u8) -> bool {
        match *self {
            Condition::Exact(expected) => symbol == expected,
            Condition::NotExact(expected) => symbol != expected,
            Condition::InRange(from, to) => (from..=to).contains(&symbol),
            Condition::NotInRange(from, to) => !(from..=to).contains(&symbol),
            Condition::NotInSet(ref ranges) => {
                !ranges.iter().any(|&(from, to)| (from..=to).contains(&symbol))
            }
            Condition::InClass(class) => class.contains(symbol),
            Condition::NotInClass(class) => !class.contains(symbol),
            Condition::Any => true,
        }
    }
}

/// One node of the automaton graph.
#[derive(Clone, Debug)]
pub(crate) struct State {
    /// On a symbol satisfying the condition, the active position moves by
    /// each of the listed offsets.
    pub transitions: Vec<(Condition, Vec<i32>)>,
    /// Moves requiring no symbol.
    pub epsilon: Vec<i32>,
    pub outcome: MatchStatus,
}

impl State {
    fn new(transitions: Vec<(Condition, Vec<i32>)>, outcome: MatchStatus) -> Self {
        State {
            transitions,
            epsilon: vec![],
            outcome,
        }
    }
}

/// A compiled automaton graph. Immutable once compilation is done.
#[derive(Clone, Debug)]
pub(crate) struct Nfa {
    pub states: Vec<State>,
}

impl Nfa {
    /// Automaton accepting exactly the empty input.
    pub fn empty() -> Self {
        Nfa {
            states: vec![State::new(vec![], MatchStatus::Accept)],
        }
    }

    /// Automaton accepting exactly one symbol satisfying `condition`.
    pub fn atom(condition: Condition) -> Self {
        Nfa {
            states: vec![
                State::new(vec![(condition, vec![1])], MatchStatus::Unsure),
                State::new(vec![], MatchStatus::Accept),
            ],
        }
    }

    /// Automaton for a bracket set given as inclusive ranges.
    ///
    /// A positive set becomes one transition per range, any of which may
    /// fire. A negated set must reject a symbol contained in *any* range, so
    /// it compiles to a single conjunctive condition. An empty set has no
    /// transitions at all and matches no symbol, negated or not.
    pub fn set(ranges: &[(u8, u8)], negate: bool) -> Self {
        let transitions = if negate {
            match ranges {
                [] => vec![],
                &[(from, to)] if from == to => vec![(Condition::NotExact(from), vec![1])],
                &[(from, to)] => vec![(Condition::NotInRange(from, to), vec![1])],
                _ => vec![(Condition::NotInSet(ranges.into()), vec![1])],
            }
        } else {
            ranges
                .iter()
                .map(|&(from, to)| {
                    let condition = if from == to {
                        Condition::Exact(from)
                    } else {
                        Condition::InRange(from, to)
                    };
                    (condition, vec![1])
                })
                .collect()
        };
        Nfa {
            states: vec![
                State::new(transitions, MatchStatus::Unsure),
                State::new(vec![], MatchStatus::Accept),
            ],
        }
    }

    /// Automaton accepting one symbol of a character class or its negation.
    pub fn class(class: CharClass, negate: bool) -> Self {
        let condition = if negate {
            Condition::NotInClass(class)
        } else {
            Condition::InClass(class)
        };
        Nfa::atom(condition)
    }

    /// `lhs` followed by `rhs`: every accepting state of `lhs` gains an
    /// epsilon edge to the entry of `rhs` and is reclassified as unsure.
    pub fn concatenate(mut lhs: Nfa, rhs: Nfa) -> Nfa {
        let lhs_len = lhs.states.len();
        for (i, state) in lhs.states.iter_mut().enumerate() {
            if state.outcome == MatchStatus::Accept {
                state.epsilon.push((lhs_len - i) as i32);
                state.outcome = MatchStatus::Unsure;
            }
        }
        lhs.states.extend(rhs.states);
        lhs
    }

    /// Either `lhs` or `rhs`: a fresh entry state epsilon-branches to both.
    pub fn unite(mut lhs: Nfa, rhs: Nfa) -> Nfa {
        let mut entry = State::new(vec![], MatchStatus::Unsure);
        entry.epsilon = vec![1, lhs.states.len() as i32 + 1];
        lhs.states.insert(0, entry);
        lhs.states.extend(rhs.states);
        lhs
    }

    /// Zero or more repetitions of `x` (Kleene star).
    ///
    /// A fresh entry branches to `x` and to a bypass accepting state
    /// appended after it; every accepting state inside `x` gains edges back
    /// to the entry of `x` and forward to the bypass, then stops accepting
    /// on its own.
    pub fn star(mut x: Nfa) -> Nfa {
        x.states.push(State::new(vec![], MatchStatus::Accept));
        let mut entry = State::new(vec![], MatchStatus::Unsure);
        entry.epsilon = vec![1, x.states.len() as i32];
        x.states.insert(0, entry);
        let len = x.states.len();
        for (i, state) in x.states.iter_mut().enumerate().take(len - 1).skip(1) {
            if state.outcome == MatchStatus::Accept {
                state.epsilon.push((len - 1 - i) as i32);
                state.epsilon.push(1 - i as i32);
                state.outcome = MatchStatus::Unsure;
            }
        }
        x
    }

    /// Between `min` and `max` repetitions of `x`, unbounded when `max` is
    /// `None`.
    ///
    /// `min` mandatory copies are concatenated; an unbounded tail is a
    /// [`star`](Nfa::star), a bounded one appends `max - min` further copies
    /// where every accepting state so far keeps accepting but also gains a
    /// forward epsilon edge into the next optional copy.
    pub fn repeat(x: Nfa, min: usize, max: Option<usize>) -> Nfa {
        debug_assert!(max.map_or(true, |max| max >= min));
        let mut result = Nfa::empty();
        for _ in 0..min {
            result = Nfa::concatenate(result, x.clone());
        }
        match max {
            None => Nfa::concatenate(result, Nfa::star(x)),
            Some(max) => {
                for _ in 0..max - min {
                    let len = result.states.len();
                    for (i, state) in result.states.iter_mut().enumerate() {
                        if state.outcome == MatchStatus::Accept {
                            state.epsilon.push((len - i) as i32);
                        }
                    }
                    result.states.extend(x.states.iter().cloned());
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_match_ctype() {
        assert!(CharClass::Word.contains(b'a'));
        assert!(CharClass::Word.contains(b'Z'));
        assert!(CharClass::Word.contains(b'0'));
        assert!(CharClass::Word.contains(b'_'));
        assert!(!CharClass::Word.contains(b'-'));

        assert!(CharClass::Digit.contains(b'7'));
        assert!(!CharClass::Digit.contains(b'x'));

        for space in [b' ', b'\t', b'\n', b'\r', 0x0b, 0x0c] {
            assert!(CharClass::Space.contains(space));
        }
        assert!(!CharClass::Space.contains(b'a'));

        assert!(CharClass::Punct.contains(b','));
        assert!(CharClass::Punct.contains(b'!'));
        assert!(!CharClass::Punct.contains(b'5'));
    }

    #[test]
    fn negated_set_rejects_every_member() {
        let nfa = Nfa::set(&[(b'a', b'c'), (b'x', b'x')], true);
        let conditions: Vec<_> = nfa.states[0]
            .transitions
            .iter()
            .map(|(condition, _)| condition)
            .collect();
        assert_eq!(conditions.len(), 1);
        for rejected in [b'a', b'b', b'c', b'x'] {
            assert!(!conditions[0].matches(rejected));
        }
        for accepted in [b'd', b'w', b'y', b'0'] {
            assert!(conditions[0].matches(accepted));
        }
    }

    #[test]
    fn empty_set_matches_nothing() {
        for negate in [false, true] {
            let nfa = Nfa::set(&[], negate);
            assert!(nfa.states[0].transitions.is_empty());
        }
    }
}
