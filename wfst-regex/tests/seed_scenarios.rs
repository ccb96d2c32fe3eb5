//! End-to-end seed scenarios (S1-S9) exercised through `FST::regex`.

use std::collections::{HashMap, HashSet};

use wfst_core::{Label, Weight};
use wfst_regex::regex;

fn compile(expr: &str) -> wfst_core::Fst {
    regex(expr, &HashMap::new(), &HashMap::new()).unwrap_or_else(|e| panic!("{expr}: {e}"))
}

fn word(s: &str) -> Vec<Label> {
    s.chars().map(|c| Label::mono(wfst_core::sym(&c.to_string()))).collect()
}

fn accepted_words(fst: &wfst_core::Fst, limit: usize) -> HashSet<String> {
    fst.words_cheapest()
        .take(limit)
        .map(|(_, seq)| seq.iter().map(|l| l.0[0].as_ref()).collect::<String>())
        .collect()
}

#[test]
fn s1_ab_literal() {
    let fst = compile("ab");
    let words = accepted_words(&fst, 100);
    assert_eq!(words, HashSet::from(["ab".to_string()]));
}

#[test]
fn s2_a_star() {
    let fst = compile("a*");
    let prefixes: Vec<_> = fst.words_cheapest().take(4).collect();
    assert_eq!(prefixes[0], (Weight::ZERO, word("")));
    assert_eq!(prefixes[1], (Weight::ZERO, word("a")));
    assert_eq!(prefixes[2], (Weight::ZERO, word("aa")));
    assert_eq!(prefixes[3], (Weight::ZERO, word("aaa")));
}

#[test]
fn s3_alternation_range() {
    let fst = compile("(a|b){2,3}");
    let words = accepted_words(&fst, 200);
    let expected: HashSet<String> = ["aa", "ab", "ba", "bb"]
        .iter()
        .flat_map(|two| {
            let mut v = vec![two.to_string()];
            for c in ["a", "b"] {
                v.push(format!("{two}{c}"));
            }
            v
        })
        .collect();
    assert_eq!(words, expected);
    assert_eq!(words.len(), 12);
}

#[test]
fn s4_char_class_range() {
    let fst = compile("[a-c]");
    let words = accepted_words(&fst, 10);
    assert_eq!(words, HashSet::from(["a".to_string(), "b".to_string(), "c".to_string()]));
}

#[test]
fn s5_negated_char_class_harmonizes_against_other_alphabet() {
    let abc = compile("[^a-c]");
    let abcd = compile("a|b|c|d");
    let intersected = abc.intersection(&abcd).trim();
    let words = accepted_words(&intersected, 10);
    assert_eq!(words, HashSet::from(["d".to_string()]));
}

#[test]
fn s6_crossproduct_single_arc() {
    let fst = compile("a:b");
    let (cost, seq) = fst.words_cheapest().next().unwrap();
    assert_eq!(cost, Weight::ZERO);
    assert_eq!(seq.len(), 1);
    assert_eq!(seq[0].0[0].as_ref(), "a");
    assert_eq!(seq[0].0[1].as_ref(), "b");
}

#[test]
fn s7_weighted_union_pushes_to_cheapest() {
    let fst = compile("a<1.5>|a<2.0>");
    let (cost, seq) = fst.words_nbest(1).into_iter().next().unwrap();
    assert_eq!(cost, Weight(1.5));
    assert_eq!(seq, word("a"));
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

#[test]
fn s9_ignore_allows_insertions() {
    let ab = compile("ab");
    let x = compile("x");
    let ignored = ab.ignore(&x).trim();
    let words = accepted_words(&ignored, 500);
    for w in ["ab", "axb", "xab", "abx", "axxb"] {
        assert!(words.contains(w), "expected {w:?} to be accepted, got {words:?}");
    }
}
