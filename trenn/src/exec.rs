//! Incremental simulation of a compiled automaton.

use crate::nfa::{MatchStatus, Nfa};
use crate::pattern::Pattern;

/// One live partial-match candidate: a state index plus the number of
/// symbols consumed on the path that reached it.
///
/// Several cursors can sit on the same state with different counts; this is
/// what keeps ambiguous-length matches (say `a{3}|a` after three `a`s)
/// distinguishable until someone asks for the longest one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Cursor {
    index: usize,
    count: usize,
}

/// Executes a compiled [`Pattern`] against a byte sequence fed in one byte
/// at a time.
///
/// The executor owns only its set of live cursors; the automaton graph is
/// borrowed and shared, so executors are cheap to create.
pub struct NfaExecutor<'a> {
    nfa: &'a Nfa,
    cursors: Vec<Cursor>,
}

impl<'a> NfaExecutor<'a> {
    /// Creates an executor positioned at the start of the pattern.
    pub fn new(pattern: &'a Pattern) -> Self {
        let mut exec = NfaExecutor {
            nfa: &pattern.nfa,
            cursors: vec![],
        };
        exec.start_path();
        exec
    }

    /// Adds the entry state (and its epsilon closure) to the live cursor set
    /// without discarding cursors already in flight.
    ///
    /// This keeps a fresh restart candidate alive next to partially advanced
    /// ones, which is what unanchored delimiter scanning needs: a prefix
    /// that fails to match must not prevent a match starting at the next
    /// byte.
    pub fn start_path(&mut self) {
        close_into(self.nfa, 0, 0, &mut self.cursors);
    }

    /// Discards all progress and reseeds the executor at the entry state.
    pub fn reset(&mut self) {
        self.cursors.clear();
        self.start_path();
    }

    /// Advances every live cursor by one symbol.
    ///
    /// Cursors without a transition for `symbol` simply vanish; the
    /// survivors are replaced by the epsilon closure of their successor
    /// states, each one symbol further along.
    pub fn next(&mut self, symbol: u8) {
        let previous = std::mem::take(&mut self.cursors);
        for cursor in &previous {
            let state = &self.nfa.states[cursor.index];
            for (condition, targets) in &state.transitions {
                if condition.matches(symbol) {
                    for &delta in targets {
                        close_into(
                            self.nfa,
                            jump(cursor.index, delta),
                            cursor.count + 1,
                            &mut self.cursors,
                        );
                    }
                }
            }
        }
        // Different paths can reach the same state after the same number of
        // symbols; keeping both would let the live set grow without bound.
        self.cursors.sort_unstable();
        self.cursors.dedup();
    }

    /// Aggregate verdict over the live cursors: [`MatchStatus::Accept`] if
    /// any cursor sits on an accepting state, [`MatchStatus::Refuse`] if no
    /// cursors are left, [`MatchStatus::Unsure`] otherwise.
    pub fn status(&self) -> MatchStatus {
        self.cursors
            .iter()
            .map(|cursor| self.nfa.states[cursor.index].outcome)
            .min()
            .unwrap_or(MatchStatus::Refuse)
    }

    /// The greatest symbol count among cursors on an accepting state, `0`
    /// if none accepts.
    pub fn longest_match(&self) -> usize {
        self.cursors
            .iter()
            .filter(|cursor| self.nfa.states[cursor.index].outcome == MatchStatus::Accept)
            .map(|cursor| cursor.count)
            .max()
            .unwrap_or(0)
    }

    /// Commits to the greedy interpretation: discards every cursor shorter
    /// than [`longest_match`](Self::longest_match) and returns that length.
    pub fn trim_short_matches(&mut self) -> usize {
        let longest = self.longest_match();
        self.cursors.retain(|cursor| cursor.count >= longest);
        longest
    }
}

fn jump(index: usize, delta: i32) -> usize {
    (index as isize + delta as isize) as usize
}

/// Records a cursor with the given count at `start` and at every state
/// reachable from it over epsilon edges, skipping refusing states.
///
/// Iterative with a visited set: loop constructions produce epsilon cycles
/// (`(a*)*`), so a naive recursive walk would not terminate.
fn close_into(nfa: &Nfa, start: usize, count: usize, out: &mut Vec<Cursor>) {
    let mut seen = vec![false; nfa.states.len()];
    let mut stack = vec![start];
    seen[start] = true;
    while let Some(index) = stack.pop() {
        let state = &nfa.states[index];
        for &delta in &state.epsilon {
            let target = jump(index, delta);
            if !seen[target] {
                seen[target] = true;
                stack.push(target);
            }
        }
        if state.outcome != MatchStatus::Refuse {
            out.push(Cursor { index, count });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::MatchStatus::{Accept, Refuse, Unsure};

    fn feed(exec: &mut NfaExecutor, input: &str) {
        for &byte in input.as_bytes() {
            exec.next(byte);
        }
    }

    #[test]
    fn star_lengths_grow_monotonically() {
        let pattern = Pattern::compile("a*").unwrap();
        let mut exec = pattern.executor();
        for expected in 0..4 {
            assert_eq!(exec.status(), Accept);
            assert_eq!(exec.longest_match(), expected);
            exec.next(b'a');
        }
    }

    #[test]
    fn ambiguous_lengths_stay_live() {
        let pattern = Pattern::compile("(a{3}|a)").unwrap();
        let mut exec = pattern.executor();

        exec.next(b'a');
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 1);

        exec.next(b'a');
        assert_eq!(exec.status(), Unsure);
        assert_eq!(exec.longest_match(), 0);

        exec.next(b'a');
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 3);

        exec.next(b'a');
        assert_eq!(exec.status(), Refuse);
    }

    #[test]
    fn trim_commits_to_the_longest_match() {
        let pattern = Pattern::compile("(a{3}|a)").unwrap();
        let mut exec = pattern.executor();
        exec.next(b'a');
        // Both the 1-long accept and the in-flight 3-long candidate live.
        assert_eq!(exec.trim_short_matches(), 1);
        assert_eq!(exec.status(), Accept);
    }

    #[test]
    fn reset_replays_identically() {
        let pattern = Pattern::compile("(ab)+c?").unwrap();

        let mut exec = pattern.executor();
        feed(&mut exec, "abab");
        let first = (exec.status(), exec.longest_match(), exec.cursors.clone());

        exec.reset();
        feed(&mut exec, "abab");
        let replay = (exec.status(), exec.longest_match(), exec.cursors.clone());

        let mut fresh = pattern.executor();
        feed(&mut fresh, "abab");
        let second = (fresh.status(), fresh.longest_match(), fresh.cursors);

        assert_eq!(first, replay);
        assert_eq!(first, second);
    }

    #[test]
    fn compilation_is_deterministic() {
        let once = Pattern::compile("(x|[a-f]){2,4}\\d*").unwrap();
        let twice = Pattern::compile("(x|[a-f]){2,4}\\d*").unwrap();
        for input in ["", "x", "xa", "xf19", "ffff77", "xg", "xxxxx"] {
            let mut lhs = once.executor();
            let mut rhs = twice.executor();
            feed(&mut lhs, input);
            feed(&mut rhs, input);
            assert_eq!(lhs.status(), rhs.status(), "input {:?}", input);
            assert_eq!(lhs.longest_match(), rhs.longest_match());
        }
    }

    #[test]
    fn nested_star_epsilon_cycle_terminates() {
        let pattern = Pattern::compile("(a*)*").unwrap();
        let mut exec = pattern.executor();
        assert_eq!(exec.status(), Accept);
        feed(&mut exec, "aaa");
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 3);
    }

    #[test]
    fn bounded_repetition_window() {
        let pattern = Pattern::compile(",{1,2}").unwrap();
        let mut exec = pattern.executor();
        assert_eq!(exec.status(), Unsure);
        exec.next(b',');
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 1);
        exec.next(b',');
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 2);
        exec.next(b',');
        assert_eq!(exec.status(), Refuse);
    }

    #[test]
    fn empty_bracket_set_matches_no_symbol() {
        for pattern in ["[]", "[^]"] {
            let pattern = Pattern::compile(pattern).unwrap();
            let mut exec = pattern.executor();
            assert_eq!(exec.status(), Unsure);
            exec.next(b'a');
            assert_eq!(exec.status(), Refuse);
        }
    }

    #[test]
    fn negated_set_semantics() {
        let pattern = Pattern::compile("[^ab]").unwrap();
        for (byte, expected) in [(b'a', Refuse), (b'b', Refuse), (b'c', Accept)] {
            let mut exec = pattern.executor();
            exec.next(byte);
            assert_eq!(exec.status(), expected, "byte {:?}", byte as char);
        }
    }

    #[test]
    fn classes_and_escapes() {
        let pattern = Pattern::compile("\\d+\\s\\w*").unwrap();
        let mut exec = pattern.executor();
        feed(&mut exec, "42 x_1");
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 6);
    }

    #[test]
    fn start_path_enables_unanchored_scans() {
        let pattern = Pattern::compile("ab").unwrap();
        let mut exec = pattern.executor();
        for &byte in b"xxab" {
            exec.next(byte);
            if exec.status() == Accept {
                break;
            }
            exec.start_path();
        }
        assert_eq!(exec.status(), Accept);
        assert_eq!(exec.longest_match(), 2);
    }
}
