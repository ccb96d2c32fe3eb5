//! AT&T text serialization: one line per transition
//! (`src\tdst\ttape1[\ttape2...]\tweight`), then one line per final state
//! (`state\tweight`). The initial state is always numbered `0`; every other
//! state is numbered in ascending arena-index order, which is arbitrary
//! but reproducible run to run for a fixed graph.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::fst::Fst;

impl Fst {
    fn state_numbers(&self) -> Vec<usize> {
        let mut numbers = vec![0usize; self.states.len()];
        let mut next = 1;
        for s in 0..self.states.len() {
            if s == self.initial {
                numbers[s] = 0;
            } else {
                numbers[s] = next;
                next += 1;
            }
        }
        numbers
    }

    /// A state's `name` if it has one, else its integer id rendered as a string.
    fn state_label(&self, s: usize, numbers: &[usize]) -> String {
        match &self.states[s].name {
            Some(name) => name.clone(),
            None => numbers[s].to_string(),
        }
    }

    /// Render as AT&T text.
    pub fn to_att_string(&self) -> String {
        format!("{self}")
    }

    /// Write the AT&T text representation to `path`.
    pub fn write_att(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = File::create(path)?;
        write!(file, "{self}")
    }
}

impl fmt::Display for Fst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers = self.state_numbers();
        for s in 0..self.states.len() {
            for (label, arc) in self.states[s].all_transitions() {
                let tapes: Vec<&str> = label.0.iter().map(|sym| sym.as_ref()).collect();
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}",
                    self.state_label(s, &numbers),
                    self.state_label(arc.target, &numbers),
                    tapes.join("\t"),
                    arc.weight.0
                )?;
            }
        }
        for s in 0..self.states.len() {
            if self.is_final(s) {
                writeln!(f, "{}\t{}", self.state_label(s, &numbers), self.final_weight(s).0)?;
            }
        }
        Ok(())
    }
}
