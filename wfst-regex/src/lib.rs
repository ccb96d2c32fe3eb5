//! The regex front end: a hand-written tokenizer, a shunting-yard parser
//! into postfix, and a stack-machine compiler that evaluates the postfix
//! stream into [`Fst`]s via the `wfst-core` algebra engine.

pub mod charclass;
pub mod compiler;
pub mod lexer;
pub mod parser;

use std::collections::HashMap;

use wfst_core::{Fst, WfstResult};

pub use compiler::RegexFn;
pub use lexer::{TokKind, Token};

/// Compile a regex surface expression end to end: tokenize, insert implicit
/// concatenation, shunting-yard to postfix, then evaluate. `defined` binds
/// `$name` variables to already-built FSTs; `functions` extends the builtin
/// registry (`reverse`, `invert`, `minimize`, `determinize`, `ignore`) with
/// user-supplied `$^name(...)` calls.
pub fn regex(
    expression: &str,
    defined: &HashMap<String, Fst>,
    functions: &HashMap<String, RegexFn>,
) -> WfstResult<Fst> {
    let tokens = lexer::tokenize(expression)?;
    let tokens = lexer::add_concat(tokens);
    let postfix = parser::parse(tokens, expression)?;
    compiler::compile(postfix, defined, functions, expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(expr: &str) -> Fst {
        regex(expr, &HashMap::new(), &HashMap::new()).unwrap_or_else(|e| panic!("{expr}: {e}"))
    }

    fn accepts(fst: &Fst, word: &str) -> bool {
        let target: Vec<wfst_core::Label> =
            word.chars().map(|c| wfst_core::Label::mono(wfst_core::sym(&c.to_string()))).collect();
        fst.words_cheapest().take(20_000).any(|(_, seq)| seq == target)
    }

    #[test]
    fn s1_literal_concat() {
        let fst = compile("ab");
        assert!(accepts(&fst, "ab"));
        assert!(!accepts(&fst, "a"));
        assert!(!accepts(&fst, ""));
        assert!(!accepts(&fst, "abc"));
    }

    #[test]
    fn s4_char_class() {
        let fst = compile("[a-c]");
        assert!(accepts(&fst, "a"));
        assert!(accepts(&fst, "b"));
        assert!(accepts(&fst, "c"));
        assert!(!accepts(&fst, "d"));
    }

    #[test]
    fn s6_transducer_pair() {
        let fst = compile("a:b");
        let (cost, seq) = fst.words_cheapest().next().unwrap();
        assert_eq!(cost, wfst_core::Weight::ZERO);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].0[0].as_ref(), "a");
        assert_eq!(seq[0].0[1].as_ref(), "b");
    }

    #[test]
    fn s8_composition_identity() {
        let ab = compile("a:b");
        let bc = compile("b:c");
        let composed = ab.compose(&bc).coaccessible();
        let (_, seq) = composed.words_cheapest().next().unwrap();
        assert_eq!(seq[0].0[0].as_ref(), "a");
        assert_eq!(seq[0].0[seq[0].0.len() - 1].as_ref(), "c");
    }
}
