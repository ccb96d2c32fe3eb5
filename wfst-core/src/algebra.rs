//! Binary algebra: union, concatenation, Kleene closure, optional,
//! cross-product, composition, intersection, difference, reverse, invert,
//! project, ignore, and alphabet harmonization for the `.` wildcard.

use std::collections::{HashMap, HashSet};

use crate::copy::copy_mod;
use crate::fst::Fst;
use crate::label::{sym, Label, Symbol, EPSILON, WILDCARD};
use crate::state::{ArcEnd, StateId};
use crate::weight::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureMode {
    Star,
    Plus,
}

/// Appends every state of `src` onto `dest`'s arena (without touching
/// `dest`'s existing wiring or finality), returning the old-id -> new-id
/// mapping. Callers are responsible for wiring the grafted copy into the
/// rest of the graph and deciding what becomes final.
fn graft(dest: &mut Fst, src: &Fst) -> Vec<StateId> {
    let offset = dest.states.len();
    for _ in 0..src.states.len() {
        dest.new_state();
    }
    let mapping: Vec<StateId> = (0..src.states.len()).map(|i| offset + i).collect();
    for s in 0..src.states.len() {
        for (label, arc) in src.states[s].all_transitions() {
            dest.states[mapping[s]].add_transition(mapping[arc.target], label.clone(), arc.weight);
        }
    }
    mapping
}

fn non_wildcard(set: &HashSet<Symbol>) -> HashSet<Symbol> {
    set.iter().filter(|s| s.as_ref() != WILDCARD).cloned().collect()
}

fn expand_wildcard(target: &mut Fst, other: &Fst) {
    if !target.alphabet.contains(WILDCARD) {
        return;
    }
    if non_wildcard(&target.alphabet) == non_wildcard(&other.alphabet) {
        return;
    }
    let expand: HashSet<Symbol> = other
        .alphabet
        .iter()
        .filter(|s| !target.alphabet.contains(*s) && s.as_ref() != WILDCARD && !s.is_empty())
        .cloned()
        .collect();
    for s in 0..target.states.len() {
        let wildcard_arcs: Vec<(Label, ArcEnd)> = target.states[s]
            .all_transitions()
            .filter(|(l, _)| l.0.iter().any(|t| t.as_ref() == WILDCARD))
            .map(|(l, a)| (l.clone(), *a))
            .collect();
        for (label, arc) in wildcard_arcs {
            for sub in &expand {
                let new_label = Label(
                    label
                        .0
                        .iter()
                        .map(|t| if t.as_ref() == WILDCARD { sub.clone() } else { t.clone() })
                        .collect(),
                );
                target.states[s].add_transition(arc.target, new_label, arc.weight);
            }
        }
    }
}

/// Before any binary op that pairs arc labels across operands, each side
/// copies itself if its alphabet contains `.` and the sides' non-wildcard
/// alphabets differ, expanding every `.`-labeled arc into parallel arcs for
/// each symbol the other side has and this side lacks. Both results carry
/// the union of the two original alphabets.
fn harmonize(a: &Fst, b: &Fst) -> (Fst, Fst) {
    let mut a_out = a.clone();
    let mut b_out = b.clone();
    expand_wildcard(&mut a_out, b);
    expand_wildcard(&mut b_out, a);
    let merged: HashSet<Symbol> = a.alphabet.union(&b.alphabet).cloned().collect();
    a_out.alphabet = merged.clone();
    b_out.alphabet = merged;
    (a_out, b_out)
}

impl Fst {
    /// `L(A∪B) = L(A) ∪ L(B)`. A fresh initial fans out into copies of A's
    /// and B's arcs; if either original initial was final, the new initial
    /// is final too with the min of the two initial final weights.
    pub fn union(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        let mut newfst = Fst::new();
        let map_a = graft(&mut newfst, &a);
        let map_b = graft(&mut newfst, &b);

        for (label, arc) in a.states[a.initial].all_transitions() {
            newfst.states[newfst.initial].add_transition(map_a[arc.target], label.clone(), arc.weight);
        }
        for (label, arc) in b.states[b.initial].all_transitions() {
            newfst.states[newfst.initial].add_transition(map_b[arc.target], label.clone(), arc.weight);
        }

        for &f in &a.finals {
            newfst.finals.insert(map_a[f]);
            newfst.states[map_a[f]].final_weight = a.states[f].final_weight;
        }
        for &f in &b.finals {
            newfst.finals.insert(map_b[f]);
            newfst.states[map_b[f]].final_weight = b.states[f].final_weight;
        }

        if a.is_final(a.initial) || b.is_final(b.initial) {
            newfst.finals.insert(newfst.initial);
            newfst.states[newfst.initial].final_weight =
                a.final_weight(a.initial).oplus(b.final_weight(b.initial));
        }
        newfst.alphabet = a.alphabet.clone();
        newfst
    }

    /// `L(A·B) = { uv : u∈L(A), v∈L(B) }` with weight sums. May produce
    /// non-accessible states; the regex compiler trims with `.accessible()`
    /// after every concat.
    pub fn concatenate(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        let mut newfst = Fst { states: Vec::new(), initial: 0, finals: HashSet::new(), alphabet: HashSet::new() };
        let map_a = graft(&mut newfst, &a);
        let map_b = graft(&mut newfst, &b);
        newfst.initial = map_a[a.initial];

        for &f in &a.finals {
            let f_weight = a.states[f].final_weight;
            for (label, arc) in b.states[b.initial].all_transitions() {
                newfst.states[map_a[f]].add_transition(map_b[arc.target], label.clone(), arc.weight + f_weight);
            }
        }

        for &f in &b.finals {
            newfst.finals.insert(map_b[f]);
            newfst.states[map_b[f]].final_weight = b.states[f].final_weight;
        }
        if b.is_final(b.initial) {
            for &f in &a.finals {
                newfst.finals.insert(map_a[f]);
                newfst.states[map_a[f]].final_weight = a.states[f].final_weight + b.final_weight(b.initial);
            }
        }
        newfst.alphabet = a.alphabet.clone();
        newfst
    }

    /// `L(A*) = {ε} ∪ L(A) ∪ L(A·A) ∪ …` (Thompson-style, no epsilons
    /// introduced). `mode = Plus` suppresses the fresh initial's finality
    /// unless the original initial was already final.
    pub fn kleene_closure(&self, mode: ClosureMode) -> Fst {
        let mut newfst = Fst::new();
        let map = graft(&mut newfst, self);

        for (label, arc) in self.states[self.initial].all_transitions() {
            newfst.states[newfst.initial].add_transition(map[arc.target], label.clone(), arc.weight);
        }
        for &f in &self.finals {
            for (label, arc) in self.states[self.initial].all_transitions() {
                newfst.states[map[f]].add_transition(map[arc.target], label.clone(), arc.weight);
            }
            newfst.states[map[f]].final_weight = self.states[f].final_weight;
            newfst.finals.insert(map[f]);
        }
        if mode == ClosureMode::Star || self.is_final(self.initial) {
            newfst.finals.insert(newfst.initial);
            newfst.states[newfst.initial].final_weight = Weight::ZERO;
        }
        newfst.alphabet = self.alphabet.clone();
        newfst
    }

    /// Same as `A | ε`. A mutating unary op: if the initial state is
    /// already final this is a no-op; otherwise a fresh initial mirroring
    /// the old initial's arcs is spliced in and marked final with weight 0.
    pub fn optional(mut self) -> Self {
        if self.is_final(self.initial) {
            return self;
        }
        let old_initial = self.initial;
        let new_initial = self.new_state();
        let arcs: Vec<(Label, ArcEnd)> = self.states[old_initial]
            .all_transitions()
            .map(|(l, a)| (l.clone(), *a))
            .collect();
        for (label, arc) in arcs {
            self.states[new_initial].add_transition(arc.target, label, arc.weight);
        }
        self.initial = new_initial;
        self.finals.insert(new_initial);
        self.states[new_initial].final_weight = Weight::ZERO;
        self
    }

    /// Adds `weight` to every final state's weight. Mutates, returns `self`
    /// to allow chaining (e.g. `fst.add_weight(w).push_weights()`).
    pub fn add_weight(mut self, weight: Weight) -> Self {
        for f in self.finals.clone() {
            self.states[f].final_weight += weight;
        }
        self
    }

    /// Reverses each label tuple in place. `invert(invert(A)) ≡ A`.
    pub fn invert(mut self) -> Self {
        for s in 0..self.states.len() {
            let old = self.states[s].transitions.clone();
            let mut newmap: HashMap<Label, HashSet<ArcEnd>> = HashMap::new();
            for (label, arcs) in old {
                newmap.entry(label.reversed()).or_default().extend(arcs);
            }
            self.states[s].set_transitions(newmap);
        }
        self
    }

    /// Retains only tape `dim` of each label (`dim == -1` means the last
    /// tape, regardless of arity).
    pub fn project(mut self, dim: i64) -> Self {
        for s in 0..self.states.len() {
            let old = self.states[s].transitions.clone();
            let mut newmap: HashMap<Label, HashSet<ArcEnd>> = HashMap::new();
            for (label, arcs) in old {
                let projected = if dim == -1 { label.project_last() } else { label.project(dim as usize) };
                newmap.entry(projected).or_default().extend(arcs);
            }
            self.states[s].set_transitions(newmap);
        }
        self
    }

    /// Epsilon-free reversal. A fresh initial gains arcs targeting the
    /// reverse image of every state from which some final was reachable.
    /// The old initial becomes the sole "forced" final of the result.
    pub fn reverse(&self) -> Fst {
        let mut newfst = Fst::new();
        let n = self.states.len();
        let mut map = vec![0; n];
        for entry in map.iter_mut() {
            *entry = newfst.new_state();
        }

        newfst.finals.insert(map[self.initial]);
        newfst.states[map[self.initial]].final_weight = Weight::ZERO;
        if self.is_final(self.initial) {
            newfst.finals.insert(newfst.initial);
            newfst.states[newfst.initial].final_weight = self.final_weight(self.initial);
        }

        for s in 0..n {
            for (label, arc) in self.states[s].all_transitions() {
                newfst.states[map[arc.target]].add_transition(map[s], label.clone(), arc.weight);
                if self.is_final(arc.target) {
                    newfst.states[newfst.initial].add_transition(
                        map[s],
                        label.clone(),
                        arc.weight + self.final_weight(arc.target),
                    );
                }
            }
        }
        newfst.alphabet = self.alphabet.clone();
        newfst
    }

    /// `A × B`, via composition: `A` is extended to a 2-tape machine by
    /// appending `""` to each label; `B` by prepending `""`; the two are
    /// then composed.
    pub fn cross_product(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        let a2 = copy_mod(
            &a,
            |l, _| {
                let mut tapes = l.0.clone();
                tapes.push(sym(EPSILON));
                Label(tapes)
            },
            |_, w| w,
        );
        let b2 = copy_mod(
            &b,
            |l, _| {
                let mut tapes = vec![sym(EPSILON)];
                tapes.extend(l.0.iter().cloned());
                Label(tapes)
            },
            |_, w| w,
        );
        a2.compose(&b2)
    }

    /// Composition of `A, B`, expanding an acceptor into a 2-tape FST on the
    /// fly. Uses a 3-mode epsilon filter to avoid the spurious duplicate
    /// alignments a naive product construction would introduce: mode 0 is
    /// "in sync", mode 1 is "A is running ahead on its own epsilon output",
    /// mode 2 is "B is running ahead on its own epsilon input". Mode 0 is
    /// reachable from either running-ahead mode only once the two
    /// resynchronize on a real (non-epsilon) matching symbol.
    pub fn compose(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        let mut newfst = Fst::new();
        let mut s_map: HashMap<(StateId, StateId, u8), StateId> = HashMap::new();
        s_map.insert((a.initial, b.initial, 0), newfst.initial);
        let mut stack: Vec<(StateId, StateId, u8)> = vec![(a.initial, b.initial, 0)];

        while let Some((sa, sb, mode)) = stack.pop() {
            let current = s_map[&(sa, sb, mode)];
            if a.is_final(sa) && b.is_final(sb) {
                newfst.finals.insert(current);
                newfst.states[current].final_weight = a.final_weight(sa) + b.final_weight(sb);
            }

            for matchsym in a.states[sa].out_symbols() {
                if mode != 0 && matchsym.is_empty() {
                    continue;
                }
                for (out_label, out_arc) in a.states[sa].transitions_out(&matchsym) {
                    for (in_label, in_arc) in b.states[sb].transitions_in(&matchsym) {
                        let key = (out_arc.target, in_arc.target, 0u8);
                        let next = *s_map.entry(key).or_insert_with(|| {
                            let ns = newfst.new_state();
                            stack.push(key);
                            ns
                        });
                        let newlabel = out_label.merge(&in_label);
                        newfst.states[current].add_transition(next, newlabel, out_arc.weight + in_arc.weight);
                    }
                }
            }

            if mode != 2 {
                for (out_label, out_arc) in a.states[sa].transitions_out(&sym(EPSILON)) {
                    let key = (out_arc.target, sb, 1u8);
                    let next = *s_map.entry(key).or_insert_with(|| {
                        let ns = newfst.new_state();
                        stack.push(key);
                        ns
                    });
                    newfst.states[current].add_transition(next, out_label.clone(), out_arc.weight);
                }
            }

            if mode != 1 {
                for (in_label, in_arc) in b.states[sb].transitions_in(&sym(EPSILON)) {
                    let key = (sa, in_arc.target, 2u8);
                    let next = *s_map.entry(key).or_insert_with(|| {
                        let ns = newfst.new_state();
                        stack.push(key);
                        ns
                    });
                    newfst.states[current].add_transition(next, in_label.clone(), in_arc.weight);
                }
            }
        }
        newfst.alphabet = a.alphabet.clone();
        newfst
    }

    /// `L(A∩B) = L(A) ∩ L(B)` with ⊗-combined (summed) weights.
    pub fn intersection(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        a.product(
            &b,
            |t1, t2| t1 && t2,
            |w1, w2| w1 + w2,
            |x, y| x.intersection(y).cloned().collect(),
        )
    }

    /// `A` minus `B`: paths in `A` that are not in `B`. Keeps `A`'s arc
    /// weight where the two sides disagree on whether an arc exists.
    pub fn difference(&self, other: &Fst) -> Fst {
        let (a, b) = harmonize(self, other);
        a.product(&b, |t1, t2| t1 && !t2, |w1, _w2| w1, |x, y| x.union(y).cloned().collect())
    }

    /// The generic Cartesian-product state graph underlying intersection
    /// and difference. A missing arc on one side is represented by a
    /// virtual "dead" node (infinite final weight, no outgoing arcs)
    /// rather than by skipping the label outright, so that the dead branch
    /// still shows up as an (uncoaccessible, to be trimmed) state rather
    /// than silently vanishing.
    pub fn product(
        &self,
        other: &Fst,
        finalf: impl Fn(bool, bool) -> bool,
        oplus: impl Fn(Weight, Weight) -> Weight,
        pathfollow: impl Fn(&HashSet<Label>, &HashSet<Label>) -> HashSet<Label>,
    ) -> Fst {
        type Node = (Option<StateId>, Option<StateId>);

        fn is_final(fst: &Fst, n: Option<StateId>) -> bool {
            n.map(|s| fst.is_final(s)).unwrap_or(false)
        }
        fn final_weight(fst: &Fst, n: Option<StateId>) -> Weight {
            n.map(|s| fst.final_weight(s)).unwrap_or(Weight::INFINITY)
        }
        fn labels_of(fst: &Fst, n: Option<StateId>) -> HashSet<Label> {
            n.map(|s| fst.states[s].transitions.keys().cloned().collect()).unwrap_or_default()
        }
        fn arcs_for(fst: &Fst, n: Option<StateId>, label: &Label) -> Vec<(Option<StateId>, Weight)> {
            match n.and_then(|s| fst.states[s].transitions.get(label)) {
                Some(set) => set.iter().map(|a| (Some(a.target), a.weight)).collect(),
                None => vec![(None, Weight::INFINITY)],
            }
        }

        let mut newfst = Fst::new();
        let mut s_map: HashMap<Node, StateId> = HashMap::new();
        let start: Node = (Some(self.initial), Some(other.initial));
        s_map.insert(start, newfst.initial);
        let mut stack: Vec<Node> = vec![start];

        while let Some((t1, t2)) = stack.pop() {
            let current = s_map[&(t1, t2)];
            if finalf(is_final(self, t1), is_final(other, t2)) {
                newfst.finals.insert(current);
                newfst.states[current].final_weight = oplus(final_weight(self, t1), final_weight(other, t2));
            }

            let labels = pathfollow(&labels_of(self, t1), &labels_of(other, t2));
            for lbl in labels {
                for &(target1, w1) in &arcs_for(self, t1, &lbl) {
                    for &(target2, w2) in &arcs_for(other, t2, &lbl) {
                        let key = (target1, target2);
                        let next = *s_map.entry(key).or_insert_with(|| {
                            let ns = newfst.new_state();
                            stack.push(key);
                            ns
                        });
                        newfst.states[current].add_transition(next, lbl.clone(), oplus(w1, w2));
                    }
                }
            }
        }
        newfst
    }

    /// `A`, ignoring intervening instances of `B`: `A ∘ (. ∪ (ε:B))* `,
    /// then projected onto the output tape.
    pub fn ignore(&self, other: &Fst) -> Fst {
        let wildcard = Fst::single_label(Label::mono(sym(WILDCARD)), Weight::ZERO);
        let eps = Fst::epsilon(Weight::ZERO);
        let inserted = eps.cross_product(other);
        let star = wildcard.union(&inserted).kleene_closure(ClosureMode::Star);
        self.compose(&star).project(-1)
    }
}
