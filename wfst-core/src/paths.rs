//! Path enumeration: breadth-first, cost-ordered, and n-best streams
//! over the (possibly infinite, for cyclic FSTs) language an FST accepts.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::fst::Fst;
use crate::label::Label;
use crate::state::StateId;
use crate::weight::Weight;

impl Fst {
    /// All accepted paths in breadth-first order. Will iterate forever on a
    /// cyclic FST with no weight floor preventing it; callers wanting the
    /// shortest/cheapest should use [`Fst::words_cheapest`] instead.
    pub fn words(&self) -> Words<'_> {
        let mut queue = VecDeque::new();
        queue.push_back((self.initial, Weight::ZERO, Vec::new()));
        Words { fst: self, queue }
    }

    /// All accepted paths in non-decreasing cost order.
    pub fn words_cheapest(&self) -> WordsCheapest<'_> {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(CheapestItem { cost: Weight::ZERO, seq: 0, state: Some(self.initial), path: Vec::new() }));
        WordsCheapest { fst: self, heap, counter: 1 }
    }

    /// The `n` cheapest accepted paths.
    pub fn words_nbest(&self, n: usize) -> Vec<(Weight, Vec<Label>)> {
        self.words_cheapest().take(n).collect()
    }
}

pub struct Words<'a> {
    fst: &'a Fst,
    queue: VecDeque<(StateId, Weight, Vec<Label>)>,
}

impl<'a> Iterator for Words<'a> {
    type Item = (Weight, Vec<Label>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (s, cost, seq) = self.queue.pop_front()?;
            for (label, arc) in self.fst.states[s].all_transitions() {
                let mut next_seq = seq.clone();
                next_seq.push(label.clone());
                self.queue.push_back((arc.target, cost + arc.weight, next_seq));
            }
            if self.fst.is_final(s) {
                return Some((cost + self.fst.final_weight(s), seq));
            }
        }
    }
}

struct CheapestItem {
    cost: Weight,
    seq: u64,
    state: Option<StateId>,
    path: Vec<Label>,
}

impl PartialEq for CheapestItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}
impl Eq for CheapestItem {}
impl PartialOrd for CheapestItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for CheapestItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cost.cmp(&other.cost).then(self.seq.cmp(&other.seq))
    }
}

pub struct WordsCheapest<'a> {
    fst: &'a Fst,
    heap: BinaryHeap<Reverse<CheapestItem>>,
    counter: u64,
}

impl<'a> Iterator for WordsCheapest<'a> {
    type Item = (Weight, Vec<Label>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Reverse(CheapestItem { cost, state, path, .. }) = self.heap.pop()?;
            let Some(s) = state else {
                return Some((cost, path));
            };
            if self.fst.is_final(s) {
                self.heap.push(Reverse(CheapestItem {
                    cost: cost + self.fst.final_weight(s),
                    seq: self.counter,
                    state: None,
                    path: path.clone(),
                }));
                self.counter += 1;
            }
            for (label, arc) in self.fst.states[s].all_transitions() {
                let mut next_path = path.clone();
                next_path.push(label.clone());
                self.heap.push(Reverse(CheapestItem {
                    cost: cost + arc.weight,
                    seq: self.counter,
                    state: Some(arc.target),
                    path: next_path,
                }));
                self.counter += 1;
            }
        }
    }
}
