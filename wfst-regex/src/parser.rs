//! Shunting-yard parser: rewrites the (concat-augmented) token stream
//! into postfix, ready for the stack-machine compiler.

use wfst_core::{WfstError, WfstResult};

use crate::lexer::{TokKind, Token};

fn precedence(kind: TokKind) -> Option<i32> {
    match kind {
        TokKind::Func => Some(11),
        TokKind::Comma => Some(2),
        TokKind::Compose => Some(3),
        TokKind::Union | TokKind::Intersection | TokKind::Minus => Some(4),
        TokKind::Concat => Some(6),
        TokKind::Complement => Some(8),
        TokKind::Star | TokKind::Plus | TokKind::Optional | TokKind::Weight | TokKind::Range => Some(9),
        TokKind::Cp => Some(10),
        _ => None,
    }
}

fn is_operand(kind: TokKind) -> bool {
    matches!(kind, TokKind::Symbol | TokKind::Variable | TokKind::CharClass)
}

fn is_unary_post(kind: TokKind) -> bool {
    matches!(kind, TokKind::Star | TokKind::Plus | TokKind::Weight | TokKind::Optional | TokKind::Range)
}

/// Convert an (implicit-concat-augmented) token stream into postfix order.
pub fn parse(tokens: Vec<Token>, source: &str) -> WfstResult<Vec<Token>> {
    let mut output: Vec<Token> = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for tok in tokens {
        if is_operand(tok.kind) || is_unary_post(tok.kind) {
            output.push(tok);
        } else if tok.kind == TokKind::Complement || tok.kind == TokKind::Func || tok.kind == TokKind::LParen {
            stack.push(tok);
        } else if tok.kind == TokKind::RParen {
            loop {
                match stack.last() {
                    None => {
                        return Err(WfstError::parse(
                            "too many closing parentheses",
                            tok.line,
                            tok.column,
                            source,
                        ));
                    }
                    Some(top) if top.kind == TokKind::LParen => break,
                    _ => output.push(stack.pop().unwrap()),
                }
            }
            stack.pop(); // discard the LPAREN
            if matches!(stack.last(), Some(top) if top.kind == TokKind::Func) {
                output.push(stack.pop().unwrap());
            }
        } else if let Some(prec) = precedence(tok.kind) {
            while let Some(top) = stack.last() {
                match precedence(top.kind) {
                    Some(top_prec) if top_prec >= prec => output.push(stack.pop().unwrap()),
                    _ => break,
                }
            }
            stack.push(tok);
        }
    }
    while let Some(tok) = stack.pop() {
        output.push(tok);
    }
    Ok(output)
}
