//! Traversal primitives: accessibility, coaccessibility, SCC (Tarjan),
//! Dijkstra, epsilon-closure.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::fst::Fst;
use crate::state::StateId;
use crate::weight::Weight;

impl Fst {
    /// Remove states that are not on a path from the initial state.
    pub fn accessible(mut self) -> Self {
        let mut explored: HashSet<StateId> = HashSet::from([self.initial]);
        let mut stack = vec![self.initial];
        while let Some(source) = stack.pop() {
            for (_, arc) in self.states[source].all_transitions() {
                if explored.insert(arc.target) {
                    stack.push(arc.target);
                }
            }
        }
        self.retain_states(&explored);
        self
    }

    /// Remove states and transitions to states that have no path to a final
    /// state. The initial state is kept unconditionally, even if isolated.
    pub fn coaccessible(mut self) -> Self {
        let n = self.states.len();
        let mut explored: HashSet<StateId> = HashSet::from([self.initial]);
        let mut stack = vec![self.initial];
        let mut inverse: Vec<HashSet<StateId>> = vec![HashSet::new(); n];
        while let Some(source) = stack.pop() {
            for target in self.states[source].all_targets() {
                inverse[target].insert(source);
                if explored.insert(target) {
                    stack.push(target);
                }
            }
        }

        let mut coaccessible: HashSet<StateId> = self.finals.clone();
        let mut stack: VecDeque<StateId> = self.finals.iter().copied().collect();
        while let Some(source) = stack.pop_front() {
            for &prev in &inverse[source] {
                if coaccessible.insert(prev) {
                    stack.push_back(prev);
                }
            }
        }
        coaccessible.insert(self.initial);

        let all: HashSet<StateId> = (0..n).collect();
        let dead: HashSet<StateId> = all.difference(&coaccessible).copied().collect();
        for s in 0..n {
            self.states[s].remove_transitions_to_targets(&dead);
        }
        self.retain_states(&coaccessible);
        self
    }

    /// `accessible().coaccessible()`.
    pub fn trim(self) -> Self {
        self.accessible().coaccessible()
    }

    /// Drop everything not in `keep`, remapping state ids to a dense range.
    /// `initial` is always kept, per the invariant that it always belongs
    /// to `states`.
    fn retain_states(&mut self, keep: &HashSet<StateId>) {
        let mut remap: HashMap<StateId, StateId> = HashMap::new();
        let mut new_states = Vec::new();
        // Deterministic order: smallest original id first, so numbering is
        // stable given a fixed graph (the old-id ordering is itself stable
        // since states are only ever appended to the arena).
        let mut ordered: Vec<StateId> = keep.iter().copied().collect();
        ordered.sort_unstable();
        for old in ordered {
            remap.insert(old, new_states.len());
            new_states.push(self.states[old].clone());
        }
        for s in &mut new_states {
            let remapped: std::collections::HashMap<_, _> = s
                .transitions
                .iter()
                .map(|(label, arcs)| {
                    let remapped_arcs: HashSet<_> = arcs
                        .iter()
                        .map(|a| crate::state::ArcEnd {
                            target: remap[&a.target],
                            weight: a.weight,
                        })
                        .collect();
                    (label.clone(), remapped_arcs)
                })
                .collect();
            s.transitions = remapped;
        }
        self.initial = remap[&self.initial];
        self.finals = self.finals.iter().filter_map(|f| remap.get(f).copied()).collect();
        self.states = new_states;
    }

    /// Tarjan's (1972) algorithm. Returns a set of sets of states, one per SCC.
    pub fn scc(&self) -> Vec<HashSet<StateId>> {
        struct Tarjan<'a> {
            fst: &'a Fst,
            index: usize,
            stack: Vec<StateId>,
            indices: HashMap<StateId, usize>,
            lowlink: HashMap<StateId, usize>,
            onstack: HashSet<StateId>,
            sccs: Vec<HashSet<StateId>>,
        }
        impl<'a> Tarjan<'a> {
            fn strongconnect(&mut self, v: StateId) {
                self.indices.insert(v, self.index);
                self.lowlink.insert(v, self.index);
                self.index += 1;
                self.stack.push(v);
                self.onstack.insert(v);

                for target in self.fst.states[v].all_targets() {
                    if !self.indices.contains_key(&target) {
                        self.strongconnect(target);
                        let low = self.lowlink[&target].min(self.lowlink[&v]);
                        self.lowlink.insert(v, low);
                    } else if self.onstack.contains(&target) {
                        let low = self.indices[&target].min(self.lowlink[&v]);
                        self.lowlink.insert(v, low);
                    }
                }

                if self.lowlink[&v] == self.indices[&v] {
                    let mut curr = HashSet::new();
                    loop {
                        let w = self.stack.pop().unwrap();
                        self.onstack.remove(&w);
                        curr.insert(w);
                        if w == v {
                            break;
                        }
                    }
                    self.sccs.push(curr);
                }
            }
        }

        let mut t = Tarjan {
            fst: self,
            index: 0,
            stack: Vec::new(),
            indices: HashMap::new(),
            lowlink: HashMap::new(),
            onstack: HashSet::new(),
            sccs: Vec::new(),
        };
        for s in 0..self.states.len() {
            if !t.indices.contains_key(&s) {
                t.strongconnect(s);
            }
        }
        t.sccs
    }

    /// Cheapest cost from `state` to any final state under the tropical
    /// semiring, via a min-heap with a monotonic tiebreaker and the
    /// "exit sentinel" trick: when a final state is popped we additionally
    /// push a `(w + finalweight, ⊥)` record; the first `⊥` popped is the
    /// answer. Returns `+∞` if no final is reachable.
    pub fn dijkstra(&self, state: StateId, expander: impl Fn(&Fst, StateId) -> HashMap<StateId, Weight>) -> Weight {
        use std::cmp::Reverse;
        use std::collections::BinaryHeap;

        #[derive(PartialEq, Eq)]
        struct Item {
            cost: Weight,
            seq: u64,
            state: Option<StateId>,
        }
        impl Ord for Item {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.cost.cmp(&other.cost).then(self.seq.cmp(&other.seq))
            }
        }
        impl PartialOrd for Item {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut counter: u64 = 0;
        let mut explored: HashSet<StateId> = HashSet::from([state]);
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Item { cost: Weight::ZERO, seq: counter, state: Some(state) }));
        counter += 1;

        while let Some(Reverse(Item { cost: w, state: s, .. })) = heap.pop() {
            let Some(s) = s else {
                return w;
            };
            explored.insert(s);
            if self.is_final(s) {
                heap.push(Reverse(Item { cost: w + self.final_weight(s), seq: counter, state: None }));
                counter += 1;
            }
            for (target, edge_cost) in expander(self, s) {
                if !explored.contains(&target) {
                    heap.push(Reverse(Item { cost: edge_cost + w, seq: counter, state: Some(target) }));
                    counter += 1;
                }
            }
        }
        Weight::INFINITY
    }

    pub fn dijkstra_all(&self) -> HashMap<StateId, Weight> {
        (0..self.states.len())
            .map(|s| (s, self.dijkstra(s, |fst, s| fst.states[s].all_targets_cheapest())))
            .collect()
    }

    /// The set of states reachable from `state` by epsilon-hopping, with
    /// cumulative cost, excluding `state` itself.
    pub fn epsilon_closure(&self, state: StateId) -> HashMap<StateId, Weight> {
        use std::cmp::Reverse;
        use std::collections::BinaryHeap;

        #[derive(PartialEq, Eq)]
        struct Item {
            cost: Weight,
            seq: u64,
            state: StateId,
        }
        impl Ord for Item {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.cost.cmp(&other.cost).then(self.seq.cmp(&other.seq))
            }
        }
        impl PartialOrd for Item {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut explored: HashMap<StateId, Weight> = HashMap::new();
        let mut counter: u64 = 0;
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Item { cost: Weight::ZERO, seq: counter, state }));
        counter += 1;
        while let Some(Reverse(Item { cost, state: source, .. })) = heap.pop() {
            if explored.contains_key(&source) {
                continue;
            }
            explored.insert(source, cost);
            for (target, weight) in self.states[source].all_epsilon_targets_cheapest() {
                heap.push(Reverse(Item { cost: cost + weight, seq: counter, state: target }));
                counter += 1;
            }
        }
        explored.remove(&state);
        explored
    }
}
