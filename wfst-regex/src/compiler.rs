//! Postfix-stream compiler: evaluates the shunting-yard output over
//! a stack of argument lists (a plain `Vec<Fst>` stays a singleton list
//! except briefly around COMMA, which is what lets a FUNC or CP call take
//! more than one argument).

use std::collections::HashMap;

use wfst_core::transform::oplus_min;
use wfst_core::{ClosureMode, Fst, Label, Weight, WfstError, WfstResult};

use crate::charclass::parse_char_class;
use crate::lexer::{TokKind, Token};

/// A user-supplied regex function: receives the arguments gathered by a
/// `$^name(a, b, ...)` call and returns the resulting FST.
pub type RegexFn = Box<dyn Fn(&[Fst]) -> Fst>;

fn builtin(name: &str, args: &[Fst]) -> Option<Fst> {
    match (name, args) {
        ("reverse", [a]) => Some(a.reverse()),
        ("invert", [a]) => Some(a.clone().invert()),
        ("minimize", [a]) => Some(a.minimize()),
        ("determinize", [a]) => Some(a.determinize(&|s, w| (s, w), &oplus_min)),
        ("ignore", [a, b]) => Some(a.ignore(b)),
        _ => None,
    }
}

fn concat_n(fst: &Fst, n: usize) -> Fst {
    if n == 0 {
        return Fst::epsilon(Weight::ZERO);
    }
    let mut acc = fst.clone();
    for _ in 1..n {
        acc = acc.concatenate(fst);
    }
    acc
}

struct Frame(Vec<Fst>);

fn pop_list(stack: &mut Vec<Frame>, line: usize, column: usize, source: &str) -> WfstResult<Vec<Fst>> {
    stack.pop().map(|f| f.0).ok_or_else(|| WfstError::parse("stack underflow", line, column, source))
}

fn pop_one(stack: &mut Vec<Frame>, line: usize, column: usize, source: &str) -> WfstResult<Fst> {
    let mut list = pop_list(stack, line, column, source)?;
    list.pop().ok_or_else(|| WfstError::parse("stack underflow", line, column, source))
}

/// Evaluate a parsed (postfix) token stream into a single FST.
pub fn compile(
    postfix: Vec<Token>,
    defined: &HashMap<String, Fst>,
    functions: &HashMap<String, RegexFn>,
    source: &str,
) -> WfstResult<Fst> {
    let mut stack: Vec<Frame> = Vec::new();

    for tok in postfix {
        let (line, column) = (tok.line, tok.column);
        match tok.kind {
            TokKind::Func => {
                let args = pop_list(&mut stack, line, column, source)?;
                if let Some(f) = functions.get(&tok.value) {
                    stack.push(Frame(vec![f(&args)]));
                } else if let Some(result) = builtin(&tok.value, &args) {
                    stack.push(Frame(vec![result]));
                } else {
                    return Err(WfstError::semantic(
                        format!("function \"{}\" not defined", tok.value),
                        line,
                        column,
                        source,
                    ));
                }
            }
            TokKind::LParen => {
                return Err(WfstError::parse("missing closing parenthesis", line, column, source));
            }
            TokKind::Comma => {
                let one = pop_list(&mut stack, line, column, source)?;
                let mut merged = pop_list(&mut stack, line, column, source)?;
                merged.extend(one);
                stack.push(Frame(merged));
            }
            TokKind::Union => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.union(&b)]));
            }
            TokKind::Minus => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.difference(&b.determinize(&|s, w| (s, w), &oplus_min))]));
            }
            TokKind::Intersection => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.intersection(&b).coaccessible()]));
            }
            TokKind::Concat => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.concatenate(&b).accessible()]));
            }
            TokKind::Star => {
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.kleene_closure(ClosureMode::Star)]));
            }
            TokKind::Plus => {
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.kleene_closure(ClosureMode::Plus)]));
            }
            TokKind::Compose => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.compose(&b).coaccessible()]));
            }
            TokKind::Optional => {
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.optional()]));
            }
            TokKind::Range => {
                let lang = pop_one(&mut stack, line, column, source)?;
                let parts: Vec<&str> = tok.value.split(',').collect();
                let result = if parts.len() == 1 {
                    let n: usize = tok.value.parse().map_err(|_| {
                        WfstError::semantic(format!("malformed range {{{}}}", tok.value), line, column, source)
                    })?;
                    concat_n(&lang, n)
                } else if parts[0].is_empty() {
                    let n: usize = parts[1].parse().map_err(|_| {
                        WfstError::semantic(format!("malformed range {{{}}}", tok.value), line, column, source)
                    })?;
                    concat_n(&lang.optional(), n)
                } else if parts[1].is_empty() {
                    let m: usize = parts[0].parse().map_err(|_| {
                        WfstError::semantic(format!("malformed range {{{}}}", tok.value), line, column, source)
                    })?;
                    concat_n(&lang, m).concatenate(&lang.kleene_closure(ClosureMode::Star))
                } else {
                    let m: usize = parts[0].parse().map_err(|_| {
                        WfstError::semantic(format!("malformed range {{{}}}", tok.value), line, column, source)
                    })?;
                    let n: usize = parts[1].parse().map_err(|_| {
                        WfstError::semantic(format!("malformed range {{{}}}", tok.value), line, column, source)
                    })?;
                    if m > n {
                        return Err(WfstError::semantic(
                            "n must be greater than m in {m,n}",
                            line,
                            column,
                            source,
                        ));
                    }
                    let lang1 = concat_n(&lang, m);
                    let lang2 = concat_n(&lang.optional(), n - m);
                    lang1.concatenate(&lang2)
                };
                stack.push(Frame(vec![result]));
            }
            TokKind::Cp => {
                let b = pop_one(&mut stack, line, column, source)?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.cross_product(&b).coaccessible()]));
            }
            TokKind::Weight => {
                let w: f64 = tok.value.parse().map_err(|_| {
                    WfstError::semantic(format!("malformed weight <{}>", tok.value), line, column, source)
                })?;
                let a = pop_one(&mut stack, line, column, source)?;
                stack.push(Frame(vec![a.add_weight(Weight(w)).push_weights()]));
            }
            TokKind::Symbol => {
                let label = Label::mono(wfst_core::sym(&tok.value));
                stack.push(Frame(vec![Fst::single_label(label, Weight::ZERO)]));
            }
            TokKind::Variable => {
                let fst = defined.get(&tok.value).ok_or_else(|| {
                    WfstError::semantic(format!("defined FST \"{}\" not found", tok.value), line, column, source)
                })?;
                stack.push(Frame(vec![fst.clone()]));
            }
            TokKind::CharClass => {
                let (ranges, negated) = parse_char_class(&tok.value, line, column, source)?;
                stack.push(Frame(vec![Fst::character_ranges(&ranges, negated)]));
            }
            TokKind::RParen | TokKind::Complement => {
                // RPAREN never survives parsing; COMPLEMENT parses (it holds
                // precedence and triggers implicit concatenation like an
                // operand) but has no evaluation rule, so it is a no-op here.
            }
        }
    }

    if stack.len() != 1 || stack[0].0.len() != 1 {
        return Err(WfstError::parse(
            "expression did not reduce to a single result",
            0,
            0,
            source,
        ));
    }
    let result = stack.pop().unwrap().0.pop().unwrap();
    Ok(result.trim().push_weights().minimize())
}
