//! The FST container and its constructors.

use std::collections::{HashMap, HashSet};

use crate::error::{WfstError, WfstResult};
use crate::label::{sym, Label, Symbol, EPSILON, WILDCARD};
use crate::state::{State, StateId};
use crate::weight::Weight;

/// A labeled, weighted, nondeterministic graph whose paths accept pairs (or
/// n-tuples) of symbol sequences. Owns its states in an arena (`states`);
/// every `StateId` referenced by a transition is an index into that arena.
#[derive(Clone)]
pub struct Fst {
    pub states: Vec<State>,
    pub initial: StateId,
    pub finals: HashSet<StateId>,
    pub alphabet: HashSet<Symbol>,
}

/// A right-linear grammar rule: `lhs -> target [weight]`. `lhs` is either a
/// single string (acceptor) or an `(input, output)` pair (transducer).
#[derive(Clone, Debug)]
pub enum RlgLhs {
    Acceptor(String),
    Transducer(String, String),
}

#[derive(Clone, Debug)]
pub struct RlgRule {
    pub lhs: RlgLhs,
    pub target: String,
    pub weight: Option<f64>,
}

impl Fst {
    /// A single-state FST with no final states (the empty language).
    pub fn new() -> Self {
        Fst {
            states: vec![State::new()],
            initial: 0,
            finals: HashSet::new(),
            alphabet: HashSet::new(),
        }
    }

    /// The single-state epsilon acceptor: initial state is final with `weight`.
    pub fn epsilon(weight: Weight) -> Self {
        let mut fst = Fst::new();
        fst.finals.insert(fst.initial);
        fst.states[fst.initial].final_weight = weight;
        fst
    }

    /// A two-state FST accepting exactly the tuple `label`, with `weight` on
    /// the final state. If `label` is the all-epsilon label this degenerates
    /// to [`Fst::epsilon`] (a single state, since `("",)` denotes the
    /// epsilon acceptor rather than a one-arc machine).
    pub fn single_label(label: Label, weight: Weight) -> Self {
        if label.is_epsilon() {
            return Fst::epsilon(weight);
        }
        let mut fst = Fst::new();
        let target = fst.new_state();
        fst.finals.insert(target);
        fst.states[target].final_weight = weight;
        fst.alphabet = label.0.iter().cloned().collect();
        fst.states[fst.initial].add_transition(target, label, Weight::ZERO);
        fst
    }

    /// Build a two-state FSM from a list of unicode code point range pairs.
    /// Without `complement`, each code point in any range gets its own arc
    /// initial -> final. With `complement`, a single wildcard arc `"."` is
    /// added instead, and wildcard harmonization later expands it against
    /// whatever alphabet it's combined with.
    pub fn character_ranges(ranges: &[(u32, u32)], complement: bool) -> Self {
        let mut fst = Fst::new();
        let second = fst.new_state();
        fst.finals.insert(second);
        fst.states[second].final_weight = Weight::ZERO;

        let mut alphabet = HashSet::new();
        for &(start, end) in ranges {
            for cp in start..=end {
                if let Some(ch) = char::from_u32(cp) {
                    let s = sym(&ch.to_string());
                    if alphabet.insert(s.clone()) && !complement {
                        fst.states[fst.initial].add_transition(
                            second,
                            Label::mono(s),
                            Weight::ZERO,
                        );
                    }
                }
            }
        }
        if complement {
            fst.states[fst.initial].add_transition(second, Label::mono(sym(WILDCARD)), Weight::ZERO);
        }
        fst.alphabet = alphabet;
        fst
    }

    /// Compile a (weighted) right-linear grammar, similarly to lexc. One
    /// state per nonterminal name; a unique sink `"#"` is the sole final
    /// state. Each rule contributes a chain of length `max(|i|,|o|)` with the
    /// rule weight placed on the final arc of the chain.
    pub fn rlg(grammar: &HashMap<String, Vec<RlgRule>>, start: &str) -> WfstResult<Self> {
        let mut fst = Fst::new();
        let mut statedict: HashMap<String, StateId> = HashMap::new();
        // Pre-allocate: the start state becomes index 0 (our always-present
        // initial state); every other nonterminal and "#" get fresh states.
        statedict.insert(start.to_string(), fst.initial);
        fst.states[fst.initial].name = Some(start.to_string());
        for name in grammar.keys() {
            if name != start {
                let s = fst.new_state();
                fst.states[s].name = Some(name.clone());
                statedict.insert(name.clone(), s);
            }
        }
        let sink = *statedict.entry("#".to_string()).or_insert_with(|| {
            let s = fst.new_state();
            fst.states[s].name = Some("#".to_string());
            s
        });
        fst.finals.insert(sink);
        fst.states[sink].final_weight = Weight::ZERO;

        let mut alphabet = HashSet::new();
        for (name, rules) in grammar {
            let &bigstate = statedict.get(name).ok_or_else(|| {
                WfstError::operation(format!("nonterminal {name:?} not in state dictionary"))
            })?;
            for rule in rules {
                let (i_toks, o_toks) = match &rule.lhs {
                    RlgLhs::Acceptor(s) => {
                        let toks = rlg_tokenize(s);
                        (toks.clone(), toks)
                    }
                    RlgLhs::Transducer(i, o) => (rlg_tokenize(i), rlg_tokenize(o)),
                };
                for t in i_toks.iter().chain(o_toks.iter()) {
                    if !t.is_empty() {
                        alphabet.insert(sym(t));
                    }
                }
                let &target = statedict.get(&rule.target).ok_or_else(|| {
                    WfstError::operation(format!("unknown rule target {:?}", rule.target))
                })?;

                let n = i_toks.len().max(o_toks.len());
                let mut curr = bigstate;
                for idx in 0..n {
                    let ii = i_toks.get(idx).cloned().unwrap_or_default();
                    let oo = o_toks.get(idx).cloned().unwrap_or_default();
                    let is_last = idx == n - 1;
                    let (next_state, weight) = if is_last {
                        (target, rule.weight.unwrap_or(0.0))
                    } else {
                        (fst.new_state(), 0.0)
                    };
                    fst.states[curr].add_transition(
                        next_state,
                        Label::new(vec![sym(&ii), sym(&oo)]),
                        Weight(weight),
                    );
                    curr = next_state;
                }
            }
        }
        fst.alphabet = alphabet;
        Ok(fst)
    }

    pub fn new_state(&mut self) -> StateId {
        self.states.push(State::new());
        self.states.len() - 1
    }

    pub fn is_final(&self, s: StateId) -> bool {
        self.finals.contains(&s)
    }

    pub fn final_weight(&self, s: StateId) -> Weight {
        self.states[s].final_weight
    }

    pub fn set_final(&mut self, s: StateId, weight: Weight) {
        self.finals.insert(s);
        self.states[s].final_weight = weight;
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Enumerates all `(state, label, transition)` triples for the given
    /// states.
    pub fn all_transitions<'a>(
        &'a self,
        states: impl IntoIterator<Item = StateId> + 'a,
    ) -> impl Iterator<Item = (StateId, &'a Label, crate::state::Transition)> + 'a {
        states.into_iter().flat_map(move |s| {
            self.states[s]
                .all_transitions()
                .map(move |(label, arc)| (s, label, crate::state::Transition {
                    target: arc.target,
                    label: label.clone(),
                    weight: arc.weight,
                }))
        })
    }
}

impl Default for Fst {
    fn default() -> Self {
        Fst::new()
    }
}

/// Tokenize the left- or right-hand side of an rlg rule: `'…'`-quoted runs
/// become one multi-char symbol, `\x` escapes one symbol, a bare space is
/// alignment whitespace and drops to epsilon (`""`), any other single
/// character is its own symbol.
fn rlg_tokenize(w: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = w.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\'' => {
                let mut j = i + 1;
                let mut buf = String::new();
                while j < chars.len() && chars[j] != '\'' {
                    if chars[j] == '\\' && j + 1 < chars.len() {
                        buf.push(chars[j + 1]);
                        j += 2;
                    } else {
                        buf.push(chars[j]);
                        j += 1;
                    }
                }
                tokens.push(buf);
                i = j + 1;
            }
            '\\' if i + 1 < chars.len() => {
                tokens.push(chars[i + 1].to_string());
                i += 2;
            }
            ' ' => {
                tokens.push(EPSILON.to_string());
                i += 1;
            }
            c => {
                tokens.push(c.to_string());
                i += 1;
            }
        }
    }
    tokens
}
