//! Character-class body parsing: turn `^?(char|char-char|\char)+`
//! into `(lo, hi)` code-point ranges plus a negation flag.

use std::collections::HashSet;

use wfst_core::{WfstError, WfstResult};

/// Parse the raw body captured between `[` and `]` (leading `^` still
/// present). Escape characters are stripped first, recording which cleaned
/// positions they protected; a `-` is a range indicator only if it's
/// unescaped and not at either end. Every cleaned position not "covered" by
/// a range (as the dash itself, or either of its neighbors) becomes its own
/// single-character range.
pub fn parse_char_class(body: &str, line: usize, column: usize, source: &str) -> WfstResult<(Vec<(u32, u32)>, bool)> {
    let mut chars: Vec<char> = body.chars().collect();
    let negated = chars.first() == Some(&'^');
    if negated {
        chars.remove(0);
    }

    let mut clncc: Vec<char> = Vec::new();
    let mut escaped: HashSet<usize> = HashSet::new();
    let mut j = 0usize;
    for &letter in &chars {
        if letter != '\\' {
            clncc.push(letter);
            j += 1;
        } else {
            escaped.insert(j);
        }
    }

    let n = clncc.len();
    let marks: Vec<bool> =
        (0..n).map(|i| n > 1 && clncc[i] == '-' && !escaped.contains(&i) && i != 0 && i != n - 1).collect();

    let mut ranges: Vec<(u32, u32)> =
        (0..n).filter(|&i| marks[i]).map(|i| (clncc[i - 1] as u32, clncc[i + 1] as u32)).collect();

    let singles: Vec<bool> = (0..n)
        .map(|i| {
            let left = i > 0 && marks[i - 1];
            let right = i + 1 < n && marks[i + 1];
            marks[i] || left || right
        })
        .collect();

    for (i, &covered) in singles.iter().enumerate() {
        if !covered {
            ranges.push((clncc[i] as u32, clncc[i] as u32));
        }
    }

    if ranges.iter().any(|&(lo, hi)| lo > hi) {
        return Err(WfstError::semantic(
            "end must be larger than start in character class range",
            line,
            column,
            source,
        ));
    }
    Ok((ranges, negated))
}
