//! Internal copy helpers used by the structural transforms and the binary
//! algebra. Both are index-preserving: since every original state gets
//! exactly one image state, the old `StateId` is reused as the new one,
//! which sidesteps needing an explicit remapping table.

use crate::fst::Fst;
use crate::label::Label;
use crate::state::State;
use crate::weight::Weight;

/// Copy `fst`, applying `modlabel`/`modweight` to every arc's label/weight.
pub fn copy_mod(
    fst: &Fst,
    modlabel: impl Fn(&Label, Weight) -> Label,
    modweight: impl Fn(&Label, Weight) -> Weight,
) -> Fst {
    let mut new_states: Vec<State> = (0..fst.states.len()).map(|_| State::new()).collect();
    for s in 0..fst.states.len() {
        for (label, arc) in fst.states[s].all_transitions() {
            let new_label = modlabel(label, arc.weight);
            let new_weight = modweight(label, arc.weight);
            new_states[s].add_transition(arc.target, new_label, new_weight);
        }
    }
    for &f in &fst.finals {
        new_states[f].final_weight = fst.states[f].final_weight;
    }
    Fst {
        states: new_states,
        initial: fst.initial,
        finals: fst.finals.clone(),
        alphabet: fst.alphabet.clone(),
    }
}

/// Copy `fst`, keeping only arcs whose label passes `labelfilter`.
pub fn copy_filtered(fst: &Fst, labelfilter: impl Fn(&Label) -> bool) -> Fst {
    let mut new_states: Vec<State> = (0..fst.states.len()).map(|_| State::new()).collect();
    for s in 0..fst.states.len() {
        for (label, arc) in fst.states[s].all_transitions() {
            if labelfilter(label) {
                new_states[s].add_transition(arc.target, label.clone(), arc.weight);
            }
        }
    }
    for &f in &fst.finals {
        new_states[f].final_weight = fst.states[f].final_weight;
    }
    Fst {
        states: new_states,
        initial: fst.initial,
        finals: fst.finals.clone(),
        alphabet: fst.alphabet.clone(),
    }
}
