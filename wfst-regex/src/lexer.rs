//! Tokenizer: a pattern-dispatch lexer. At each input position the
//! dispatch order below decides which rule fires, mirroring the fixed
//! priority of the alternation the reference tokenizer was built from:
//! escape, quote, whitespace, short operator, `$^name`/`$name`, `<weight>`,
//! `{range}`, `[class]`, newline, then a catch-all single-character symbol.

use wfst_core::{WfstError, WfstResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokKind {
    Symbol,
    Variable,
    Func,
    Weight,
    Range,
    CharClass,
    Union,
    Intersection,
    Minus,
    Star,
    Plus,
    LParen,
    RParen,
    Optional,
    Cp,
    Complement,
    Compose,
    Comma,
    /// Synthetic: inserted by [`add_concat`], never produced by [`tokenize`].
    Concat,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn shortop(c: char) -> Option<TokKind> {
    match c {
        '|' => Some(TokKind::Union),
        '-' => Some(TokKind::Minus),
        '&' => Some(TokKind::Intersection),
        '*' => Some(TokKind::Star),
        '+' => Some(TokKind::Plus),
        '(' => Some(TokKind::LParen),
        ')' => Some(TokKind::RParen),
        '?' => Some(TokKind::Optional),
        ':' => Some(TokKind::Cp),
        '~' => Some(TokKind::Complement),
        '@' => Some(TokKind::Compose),
        ',' => Some(TokKind::Comma),
        _ => None,
    }
}

/// Tokenize a regex surface expression.
pub fn tokenize(expression: &str) -> WfstResult<Vec<Token>> {
    let chars: Vec<char> = expression.chars().collect();
    let n = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut line_start = 0usize;

    while i < n {
        let column = i - line_start;
        let c = chars[i];

        if c == '\\' {
            if i + 1 < n {
                tokens.push(Token { kind: TokKind::Symbol, value: chars[i + 1].to_string(), line, column });
                i += 2;
            } else {
                tokens.push(Token { kind: TokKind::Symbol, value: "\\".to_string(), line, column });
                i += 1;
            }
            continue;
        }

        if c == '\'' {
            let mut j = i + 1;
            let mut buf = String::new();
            let mut closed = false;
            while j < n {
                if chars[j] == '\'' {
                    closed = true;
                    break;
                } else if chars[j] == '\\' && j + 1 < n {
                    buf.push(chars[j + 1]);
                    j += 2;
                } else {
                    buf.push(chars[j]);
                    j += 1;
                }
            }
            if !closed {
                return Err(WfstError::lex("unterminated quoted symbol", line, column, expression));
            }
            tokens.push(Token { kind: TokKind::Symbol, value: buf, line, column });
            i = j + 1;
            continue;
        }

        if c == ' ' || c == '\t' {
            while i < n && (chars[i] == ' ' || chars[i] == '\t') {
                i += 1;
            }
            continue;
        }

        if let Some(kind) = shortop(c) {
            tokens.push(Token { kind, value: c.to_string(), line, column });
            i += 1;
            continue;
        }

        if c == '$' {
            if i + 1 < n && chars[i + 1] == '^' {
                let mut j = i + 2;
                while j < n && is_word_char(chars[j]) {
                    j += 1;
                }
                if j > i + 2 {
                    let mut k = j;
                    while k < n && (chars[k] == ' ' || chars[k] == '\t') {
                        k += 1;
                    }
                    if k < n && chars[k] == '(' {
                        let name: String = chars[i + 2..j].iter().collect();
                        tokens.push(Token { kind: TokKind::Func, value: name, line, column });
                        i = j;
                        continue;
                    }
                }
            }
            let mut j = i + 1;
            while j < n && is_word_char(chars[j]) {
                j += 1;
            }
            if j > i + 1 {
                let name: String = chars[i + 1..j].iter().collect();
                tokens.push(Token { kind: TokKind::Variable, value: name, line, column });
                i = j;
                continue;
            }
            tokens.push(Token { kind: TokKind::Symbol, value: "$".to_string(), line, column });
            i += 1;
            continue;
        }

        if c == '<' {
            let mut j = i + 1;
            if j < n && (chars[j] == '+' || chars[j] == '-') {
                j += 1;
            }
            while j < n && is_digit(chars[j]) {
                j += 1;
            }
            if j < n && chars[j] == '.' {
                let dot = j;
                let mut k = j + 1;
                while k < n && is_digit(chars[k]) {
                    k += 1;
                }
                if k > dot + 1 {
                    j = k;
                }
            }
            if j < n && chars[j] == '>' {
                let value: String = chars[i + 1..j].iter().collect();
                if value.parse::<f64>().is_err() {
                    return Err(WfstError::lex(format!("malformed weight <{value}>"), line, column, expression));
                }
                tokens.push(Token { kind: TokKind::Weight, value, line, column });
                i = j + 1;
                continue;
            }
            tokens.push(Token { kind: TokKind::Symbol, value: "<".to_string(), line, column });
            i += 1;
            continue;
        }

        if c == '{' {
            let mut j = i + 1;
            let d1_start = j;
            while j < n && is_digit(chars[j]) {
                j += 1;
            }
            let d1_end = j;
            let mut has_comma = false;
            if j < n && chars[j] == ',' {
                has_comma = true;
                j += 1;
            }
            let d2_start = j;
            while j < n && is_digit(chars[j]) {
                j += 1;
            }
            let d2_end = j;
            let has_content = d1_end > d1_start || (has_comma && d2_end > d2_start);
            if has_content && j < n && chars[j] == '}' {
                let value: String = chars[i + 1..j].iter().collect();
                tokens.push(Token { kind: TokKind::Range, value, line, column });
                i = j + 1;
                continue;
            }
            tokens.push(Token { kind: TokKind::Symbol, value: "{".to_string(), line, column });
            i += 1;
            continue;
        }

        if c == '[' {
            let mut j = i + 1;
            let mut last_bracket = None;
            while j < n && chars[j] != '[' {
                if chars[j] == ']' {
                    last_bracket = Some(j);
                }
                j += 1;
            }
            let Some(close) = last_bracket else {
                return Err(WfstError::lex("unterminated character class", line, column, expression));
            };
            let body: String = chars[i + 1..close].iter().collect();
            tokens.push(Token { kind: TokKind::CharClass, value: body, line, column });
            i = close + 1;
            continue;
        }

        if c == '\n' {
            i += 1;
            line += 1;
            line_start = i;
            continue;
        }

        tokens.push(Token { kind: TokKind::Symbol, value: c.to_string(), line, column });
        i += 1;
    }

    Ok(tokens)
}

fn is_operand(kind: TokKind) -> bool {
    matches!(kind, TokKind::Symbol | TokKind::Variable | TokKind::CharClass)
}

/// True for every token kind that appears in the precedence table, except
/// the postfix-unary ones (`* + ? {} <w>`) — i.e. the set that resets the
/// "just saw an operand" state tracked by [`add_concat`].
fn is_resetter(kind: TokKind) -> bool {
    matches!(
        kind,
        TokKind::Func
            | TokKind::Comma
            | TokKind::Compose
            | TokKind::Union
            | TokKind::Intersection
            | TokKind::Minus
            | TokKind::Concat
            | TokKind::Complement
            | TokKind::Cp
    )
}

/// Insert synthetic CONCAT tokens: a two-state automaton over the token
/// stream. After any operand we're "pending concat"; seeing `(`, `~`, or
/// another operand while pending emits a CONCAT first; any binary operator
/// clears the pending state.
pub fn add_concat(tokens: Vec<Token>) -> Vec<Token> {
    let mut counter = 0u8;
    let mut result = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if counter == 1 && (tok.kind == TokKind::LParen || tok.kind == TokKind::Complement || is_operand(tok.kind)) {
            result.push(Token { kind: TokKind::Concat, value: String::new(), line: tok.line, column: tok.column });
            counter = 0;
        }
        if is_operand(tok.kind) {
            counter = 1;
        }
        if is_resetter(tok.kind) {
            counter = 0;
        }
        result.push(tok);
    }
    result
}
