//! Structural transforms: weight pushing, epsilon removal,
//! determinization, minimization.

use std::collections::{HashMap, HashSet};

use crate::copy::{copy_filtered, copy_mod};
use crate::fst::Fst;
use crate::label::{sym, Label, Symbol};
use crate::state::{ArcEnd, StateId};
use crate::weight::Weight;

impl Fst {
    /// Push weights toward the initial state. Every finite path's total
    /// weight is unchanged; the cheapest path from any state to a final
    /// has weight 0 once pushed, except for residual weight trapped on the
    /// initial state's own SCC, which is distributed to that SCC's exits
    /// and to finals inside it (an initial state sitting on a cycle has no
    /// single arc that could absorb the residual).
    pub fn push_weights(mut self) -> Self {
        let potentials = self.dijkstra_all();
        let n = self.states.len();

        for s in 0..n {
            let pot_s = potentials[&s];
            let old = self.states[s].transitions.clone();
            let mut new_t: HashMap<Label, HashSet<ArcEnd>> = HashMap::new();
            for (label, arcs) in old {
                let new_arcs = arcs
                    .into_iter()
                    .map(|a| ArcEnd { target: a.target, weight: a.weight + potentials[&a.target] - pot_s })
                    .collect();
                new_t.insert(label, new_arcs);
            }
            self.states[s].set_transitions(new_t);
        }

        for f in self.finals.clone() {
            let pot_f = potentials[&f];
            self.states[f].final_weight = self.states[f].final_weight - pot_f;
        }

        let residual = potentials[&self.initial];
        if residual != Weight::ZERO {
            let mainscc = self
                .scc()
                .into_iter()
                .find(|scc| scc.contains(&self.initial))
                .expect("initial state belongs to exactly one SCC");

            for &s in &mainscc {
                let old = self.states[s].transitions.clone();
                let mut new_t: HashMap<Label, HashSet<ArcEnd>> = HashMap::new();
                for (label, arcs) in old {
                    let new_arcs = arcs
                        .into_iter()
                        .map(|a| {
                            if mainscc.contains(&a.target) {
                                a
                            } else {
                                ArcEnd { target: a.target, weight: a.weight + residual }
                            }
                        })
                        .collect();
                    new_t.insert(label, new_arcs);
                }
                self.states[s].set_transitions(new_t);
            }

            for &f in mainscc.intersection(&self.finals) {
                self.states[f].final_weight += residual;
            }
        }
        self
    }

    /// Create a new epsilon-free FST equivalent to `self`. For each state
    /// `s`, the epsilon-closure cost to every epsilon-reachable `t` is
    /// folded in: `t`'s non-epsilon arcs are copied onto `s` with the
    /// closure cost added, and finality propagates with the closure cost
    /// added to the final weight.
    pub fn epsilon_removal(&self) -> Self {
        let n = self.states.len();
        let eclosures: Vec<HashMap<StateId, Weight>> = (0..n).map(|s| self.epsilon_closure(s)).collect();
        if eclosures.iter().all(|ec| ec.is_empty()) {
            return self.clone();
        }

        let mut newfst = copy_filtered(self, |lbl| !lbl.is_epsilon());
        for (state, ec) in eclosures.into_iter().enumerate() {
            for (target, cost) in ec {
                for (label, arc) in self.states[target].all_transitions() {
                    if label.is_epsilon() {
                        continue;
                    }
                    newfst.states[state].add_transition(arc.target, label.clone(), cost + arc.weight);
                }
                if self.is_final(target) {
                    if !newfst.is_final(state) {
                        newfst.finals.insert(state);
                        newfst.states[state].final_weight = Weight::ZERO;
                    }
                    newfst.states[state].final_weight += cost + self.final_weight(target);
                }
            }
        }
        newfst
    }

    /// Weighted subset construction with residuals over the tropical
    /// semiring. `staterep` and `oplus` are pluggable strategy parameters;
    /// [`Fst::determinize_unweighted`] and [`Fst::determinize_as_dfa`] are
    /// both built on top of this core.
    pub fn determinize(
        &self,
        staterep: &dyn Fn(StateId, Weight) -> (StateId, Weight),
        oplus: &dyn Fn(&[Weight]) -> Weight,
    ) -> Self {
        let mut newfst = Fst::new();
        newfst.alphabet = self.alphabet.clone();
        let first_q = normalize(vec![staterep(self.initial, Weight::ZERO)]);
        let mut statesets: HashMap<MacroState, StateId> = HashMap::new();
        statesets.insert(first_q.clone(), newfst.initial);

        if self.is_final(self.initial) {
            newfst.finals.insert(newfst.initial);
            newfst.states[newfst.initial].final_weight = self.final_weight(self.initial);
        }

        let mut stack: Vec<MacroState> = vec![first_q];
        while let Some(current_q) = stack.pop() {
            let current_state = statesets[&current_q];
            let residuals: HashMap<StateId, Weight> = current_q.iter().copied().collect();

            let mut collectlabels: HashMap<Label, Vec<(StateId, ArcEnd)>> = HashMap::new();
            for &(s, _) in &current_q {
                for (label, arc) in self.states[s].all_transitions() {
                    collectlabels.entry(label.clone()).or_default().push((s, *arc));
                }
            }

            for (label, tset) in collectlabels {
                let weights: Vec<Weight> = tset.iter().map(|&(s, a)| a.weight + residuals[&s]).collect();
                let wprime = oplus(&weights);

                let new_q_raw: Vec<(StateId, Weight)> = tset
                    .iter()
                    .map(|&(s, a)| staterep(a.target, a.weight + residuals[&s] - wprime))
                    .collect();
                let new_q = normalize(new_q_raw);

                let new_state = match statesets.get(&new_q) {
                    Some(&ns) => ns,
                    None => {
                        let ns = newfst.new_state();
                        statesets.insert(new_q.clone(), ns);
                        stack.push(new_q.clone());
                        ns
                    }
                };
                newfst.states[current_state].add_transition(new_state, label, wprime);

                if tset.iter().any(|&(_, a)| self.is_final(a.target)) {
                    newfst.finals.insert(new_state);
                    let fin_weights: Vec<Weight> = tset
                        .iter()
                        .filter(|&&(_, a)| self.is_final(a.target))
                        .map(|&(s, a)| self.final_weight(a.target) + a.weight + residuals[&s] - wprime)
                        .collect();
                    newfst.states[new_state].final_weight = oplus(&fin_weights);
                }
            }
        }
        newfst
    }

    /// Determinize with all-zero weights: plain DFA-style subset
    /// construction that simply discards weight information.
    pub fn determinize_unweighted(&self) -> Self {
        self.determinize(&|s, _| (s, Weight::ZERO), &|_| Weight::ZERO)
    }

    /// Determinize as a DFA by first shifting each arc's weight into an
    /// extra (internal, synthetic) label tape so that unweighted subset
    /// construction can't silently merge arcs that used to carry different
    /// costs, then shifting the weight back out onto the arc afterward.
    pub fn determinize_as_dfa(&self) -> Self {
        let shifted = copy_mod(
            self,
            |label, weight| {
                let mut tapes = label.0.clone();
                tapes.push(weight_symbol(weight));
                Label(tapes)
            },
            |_, _| Weight::ZERO,
        );
        let determinized = shifted.determinize_unweighted();
        copy_mod(
            &determinized,
            |label, _| Label(label.0[..label.0.len() - 1].to_vec()),
            |label, _| weight_from_symbol(label.last()),
        )
    }

    /// Brzozowski minimization: `reverse → determinize → reverse → determinize`.
    pub fn minimize(&self) -> Self {
        self.reverse().determinize(&|s, w| (s, w), &oplus_min).reverse().determinize(&|s, w| (s, w), &oplus_min)
    }
}

type MacroState = Vec<(StateId, Weight)>;

fn normalize(mut v: Vec<(StateId, Weight)>) -> MacroState {
    v.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    v.dedup();
    v
}

pub fn oplus_min(weights: &[Weight]) -> Weight {
    weights.iter().copied().fold(Weight::INFINITY, Weight::oplus)
}

pub fn oplus_zero(_weights: &[Weight]) -> Weight {
    Weight::ZERO
}

/// Reserved symbol encoding used only internally by `determinize_as_dfa`.
/// Prefixed with NUL, which user-facing regex/grammar symbols never contain.
fn weight_symbol(w: Weight) -> Symbol {
    sym(&format!("\u{0}{:016x}", w.0.to_bits()))
}

fn weight_from_symbol(s: &Symbol) -> Weight {
    let bits = u64::from_str_radix(&s[1..], 16).expect("well-formed internal weight symbol");
    Weight(f64::from_bits(bits))
}
