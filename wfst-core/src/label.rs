//! Symbols and labels.
//!
//! A symbol is an opaque string token; two are distinguished: `""` (epsilon)
//! and `"."` (the alphabet-wildcard placeholder). A label is a fixed-length
//! tuple of symbols, one per tape: arity 1 for an acceptor, 2 for a plain
//! transducer, transiently 3 during composition before the merge rule
//! contracts it back down to 2.

use std::rc::Rc;

pub type Symbol = Rc<str>;

pub const EPSILON: &str = "";
pub const WILDCARD: &str = ".";

pub fn sym(s: &str) -> Symbol {
    Rc::from(s)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub Vec<Symbol>);

impl Label {
    pub fn new(tapes: Vec<Symbol>) -> Self {
        assert!(!tapes.is_empty(), "a label must have at least one tape");
        Label(tapes)
    }

    pub fn mono(s: Symbol) -> Self {
        Label(vec![s])
    }

    pub fn epsilon() -> Self {
        Label(vec![sym(EPSILON)])
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// True iff every tape of this label is the empty string.
    pub fn is_epsilon(&self) -> bool {
        self.0.iter().all(|s| s.is_empty())
    }

    pub fn first(&self) -> &Symbol {
        &self.0[0]
    }

    pub fn last(&self) -> &Symbol {
        self.0.last().expect("label has at least one tape")
    }

    /// Drops all but the `dim`-th tape. `dim == -1` (pass `arity-1` or use
    /// [`Label::project_last`]) means "last tape".
    pub fn project(&self, dim: usize) -> Label {
        Label(vec![self.0[dim].clone()])
    }

    pub fn project_last(&self) -> Label {
        Label(vec![self.last().clone()])
    }

    pub fn reversed(&self) -> Label {
        let mut tapes = self.0.clone();
        tapes.reverse();
        Label(tapes)
    }

    /// The merge rule used by composition: drop `self`'s last tape and
    /// `other`'s first tape, keeping everything else. Degenerates
    /// correctly when either side has arity 1 (an acceptor being composed
    /// with a transducer).
    pub fn merge(&self, other: &Label) -> Label {
        if self.arity() == 1 {
            let mut tapes = self.0.clone();
            tapes.extend(other.0[1..].iter().cloned());
            Label(tapes)
        } else if other.arity() == 1 {
            let mut tapes = self.0[..self.arity() - 1].to_vec();
            tapes.extend(other.0.iter().cloned());
            Label(tapes)
        } else {
            let mut tapes = self.0[..self.arity() - 1].to_vec();
            tapes.extend(other.0[1..].iter().cloned());
            Label(tapes)
        }
    }
}
