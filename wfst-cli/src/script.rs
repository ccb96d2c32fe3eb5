//! Minimal script grammar layered on top of `wfst_regex::regex`: a sequence
//! of `name = expr;` variable definitions (each may reference earlier names
//! via `$name`), followed by one bare `expr;` that becomes the script's
//! result. Blank lines and `#`-prefixed comment lines are ignored.

use std::collections::HashMap;

use wfst_core::Fst;

pub fn parse_script(source: &str) -> anyhow::Result<(HashMap<String, Fst>, String)> {
    let mut defined: HashMap<String, Fst> = HashMap::new();
    let mut final_expr: Option<String> = None;

    let cleaned: String = source
        .lines()
        .map(|line| match line.find('#') {
            Some(i) => &line[..i],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    for stmt in cleaned.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        if final_expr.is_some() {
            anyhow::bail!("script has statements after its final (bare) expression");
        }
        match stmt.split_once('=') {
            Some((name, expr)) => {
                let name = name.trim().to_string();
                let expr = expr.trim();
                let fst = wfst_regex::regex(expr, &defined, &HashMap::new())
                    .map_err(|e| anyhow::anyhow!("defining {name:?}: {e}"))?;
                defined.insert(name, fst);
            }
            None => {
                final_expr = Some(stmt.to_string());
            }
        }
    }

    let final_expr = final_expr.ok_or_else(|| anyhow::anyhow!("script has no top-level expression"))?;
    Ok((defined, final_expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_definitions_from_final_expression() {
        let (defined, expr) = parse_script("vowel = a|e|i|o|u;\n$vowel*").unwrap();
        assert!(defined.contains_key("vowel"));
        assert_eq!(expr, "$vowel*");
    }

    #[test]
    fn rejects_trailing_statements() {
        let err = parse_script("a;\nb;").unwrap_err();
        assert!(err.to_string().contains("after its final"));
    }
}
