//! State / transition primitives: nodes carrying labeled, weighted arcs.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::label::{Label, Symbol};
use crate::weight::Weight;

pub type StateId = usize;

/// The non-label, non-target part of a transition: idiomatically this is
/// what a [`State`]'s `transitions` map stores per label, since the label
/// itself is already the map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArcEnd {
    pub target: StateId,
    pub weight: Weight,
}

/// A transition as a standalone value, `(target_state, label, weight)`,
/// handed out by the iteration helpers below.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub target: StateId,
    pub label: Label,
    pub weight: Weight,
}

type InvertedIndex = HashMap<Symbol, HashSet<(Label, ArcEnd)>>;

struct Cache {
    version: u64,
    index: InvertedIndex,
}

/// A node carrying labeled, weighted outgoing arcs and lazily-built inverted
/// indices used only by composition. `version` is bumped on every mutation;
/// a cache records the version at which it was built and rebuilds itself
/// when stale, rather than needing to be explicitly invalidated.
pub struct State {
    pub transitions: HashMap<Label, HashSet<ArcEnd>>,
    pub final_weight: Weight,
    pub name: Option<String>,
    version: u64,
    transitions_in: RefCell<Option<Cache>>,
    transitions_out: RefCell<Option<Cache>>,
}

impl Clone for State {
    fn clone(&self) -> Self {
        State {
            transitions: self.transitions.clone(),
            final_weight: self.final_weight,
            name: self.name.clone(),
            version: self.version,
            // Caches are derived data; a fresh clone rebuilds them on demand.
            transitions_in: RefCell::new(None),
            transitions_out: RefCell::new(None),
        }
    }
}

impl State {
    pub fn new() -> Self {
        State {
            transitions: HashMap::new(),
            final_weight: Weight::INFINITY,
            name: None,
            version: 0,
            transitions_in: RefCell::new(None),
            transitions_out: RefCell::new(None),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut s = State::new();
        s.name = Some(name.into());
        s
    }

    /// Appends a transition; invalidates (by version bump) the lazy indices.
    /// Transitions have set semantics: re-adding an identical
    /// (target, label, weight) triple is a no-op.
    pub fn add_transition(&mut self, target: StateId, label: Label, weight: Weight) {
        self.transitions
            .entry(label)
            .or_default()
            .insert(ArcEnd { target, weight });
        self.version += 1;
    }

    /// Wholesale-replaces the transition map (used by algorithms that
    /// rewrite every arc's weight, e.g. weight pushing); bumps `version`.
    pub fn set_transitions(&mut self, transitions: HashMap<Label, HashSet<ArcEnd>>) {
        self.transitions = transitions;
        self.version += 1;
    }

    /// Drops arcs whose target is in `targets`; purges empty label buckets.
    pub fn remove_transitions_to_targets(&mut self, targets: &HashSet<StateId>) {
        self.transitions.retain(|_, arcs| {
            arcs.retain(|a| !targets.contains(&a.target));
            !arcs.is_empty()
        });
        self.version += 1;
    }

    pub fn all_transitions(&self) -> impl Iterator<Item = (&Label, &ArcEnd)> {
        self.transitions
            .iter()
            .flat_map(|(label, arcs)| arcs.iter().map(move |a| (label, a)))
    }

    pub fn all_targets(&self) -> HashSet<StateId> {
        self.transitions
            .values()
            .flat_map(|arcs| arcs.iter().map(|a| a.target))
            .collect()
    }

    /// For each reachable target, the minimum outgoing weight to it.
    pub fn all_targets_cheapest(&self) -> HashMap<StateId, Weight> {
        let mut out: HashMap<StateId, Weight> = HashMap::new();
        for arcs in self.transitions.values() {
            for a in arcs {
                let entry = out.entry(a.target).or_insert(Weight::INFINITY);
                *entry = entry.oplus(a.weight);
            }
        }
        out
    }

    /// Same as [`State::all_targets_cheapest`], restricted to labels whose
    /// every tape is epsilon.
    pub fn all_epsilon_targets_cheapest(&self) -> HashMap<StateId, Weight> {
        let mut out: HashMap<StateId, Weight> = HashMap::new();
        for (label, arcs) in &self.transitions {
            if !label.is_epsilon() {
                continue;
            }
            for a in arcs {
                let entry = out.entry(a.target).or_insert(Weight::INFINITY);
                *entry = entry.oplus(a.weight);
            }
        }
        out
    }

    fn rebuild_in(&self) -> InvertedIndex {
        let mut idx: InvertedIndex = HashMap::new();
        for (label, arcs) in &self.transitions {
            for a in arcs {
                idx.entry(label.first().clone())
                    .or_default()
                    .insert((label.clone(), *a));
            }
        }
        idx
    }

    fn rebuild_out(&self) -> InvertedIndex {
        let mut idx: InvertedIndex = HashMap::new();
        for (label, arcs) in &self.transitions {
            for a in arcs {
                idx.entry(label.last().clone())
                    .or_default()
                    .insert((label.clone(), *a));
            }
        }
        idx
    }

    /// Mapping from the first-tape symbol to `{(label, arc)}`; built on
    /// first demand, rebuilt whenever a mutation has bumped `version`.
    pub fn transitions_in(&self, sym: &Symbol) -> HashSet<(Label, ArcEnd)> {
        let mut cache = self.transitions_in.borrow_mut();
        if cache.as_ref().map(|c| c.version) != Some(self.version) {
            *cache = Some(Cache { version: self.version, index: self.rebuild_in() });
        }
        cache
            .as_ref()
            .unwrap()
            .index
            .get(sym)
            .cloned()
            .unwrap_or_default()
    }

    /// Mapping from the last-tape symbol to `{(label, arc)}`.
    pub fn transitions_out(&self, sym: &Symbol) -> HashSet<(Label, ArcEnd)> {
        let mut cache = self.transitions_out.borrow_mut();
        if cache.as_ref().map(|c| c.version) != Some(self.version) {
            *cache = Some(Cache { version: self.version, index: self.rebuild_out() });
        }
        cache
            .as_ref()
            .unwrap()
            .index
            .get(sym)
            .cloned()
            .unwrap_or_default()
    }

    /// All first-tape symbols with at least one outgoing arc (used by
    /// composition to enumerate candidate match symbols).
    pub fn out_symbols(&self) -> HashSet<Symbol> {
        self.transitions.keys().map(|l| l.last().clone()).collect()
    }
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}
