//! Universal algebraic properties (`spec.md` §8, properties 1-11), exercised
//! directly against the `Fst` API rather than through the regex front end.

use std::collections::HashSet;

use wfst_core::{sym, Fst, Label, Weight};

fn lit(s: &str) -> Fst {
    Fst::single_label(Label::mono(sym(s)), Weight::ZERO)
}

fn words(fst: &Fst, limit: usize) -> HashSet<String> {
    fst.words_cheapest()
        .take(limit)
        .map(|(_, seq)| seq.iter().map(|l| l.0[0].as_ref()).collect::<String>())
        .collect()
}

#[test]
fn property1_trim_preserves_language() {
    let a = lit("a").union(&lit("b"));
    assert_eq!(words(&a, 10), words(&a.clone().trim(), 10));
}

#[test]
fn property2_union_intersection_concat_kleene() {
    let a = lit("a");
    let b = lit("b");

    let u = a.union(&b);
    assert_eq!(words(&u, 10), HashSet::from(["a".to_string(), "b".to_string()]));

    let i = a.intersection(&a).trim();
    assert_eq!(words(&i, 10), HashSet::from(["a".to_string()]));

    let c = a.concatenate(&b).accessible();
    assert_eq!(words(&c, 10), HashSet::from(["ab".to_string()]));

    let star = a.kleene_closure(wfst_core::ClosureMode::Star);
    let prefixes: Vec<_> = star.words_cheapest().take(3).map(|(_, seq)| seq.len()).collect();
    assert_eq!(prefixes, vec![0, 1, 2]);
}

#[test]
fn property3_invert_involution() {
    let ab = lit("a").concatenate(&lit("b")).accessible();
    let twice = ab.clone().invert().invert();
    assert_eq!(words(&twice, 10), words(&ab, 10));
}

#[test]
fn property4_reverse_involution() {
    let ab = lit("a").concatenate(&lit("b")).accessible();
    let reversed_twice = ab.reverse().reverse();
    // reverse() of an acyclic acceptor reverses the accepted string; doing
    // it twice must recover the original language.
    assert_eq!(words(&reversed_twice, 10), words(&ab, 10));
}

#[test]
fn property5_composition_associativity() {
    let transducer = |i: &str, o: &str| Fst::single_label(Label::new(vec![sym(i), sym(o)]), Weight::ZERO);
    let a = transducer("a", "b");
    let b = transducer("b", "c");
    let c = transducer("c", "d");

    let left = a.compose(&b.compose(&c).coaccessible()).coaccessible();
    let right = a.compose(&b).coaccessible().compose(&c).coaccessible();

    let labels_of = |fst: &Fst| -> HashSet<(String, String)> {
        fst.words_cheapest()
            .take(10)
            .map(|(_, seq)| (seq[0].0[0].as_ref().to_string(), seq[0].last().as_ref().to_string()))
            .collect()
    };
    assert_eq!(labels_of(&left), labels_of(&right));
    assert_eq!(labels_of(&left), HashSet::from([("a".to_string(), "d".to_string())]));
}

#[test]
fn property6_cross_product_identity() {
    let a = lit("a");
    let b = lit("b");
    let direct = a.cross_product(&b);
    let (cost, seq) = direct.words_cheapest().next().unwrap();
    assert_eq!(cost, Weight::ZERO);
    assert_eq!(seq[0].0[0].as_ref(), "a");
    assert_eq!(seq[0].0[1].as_ref(), "b");
}

#[test]
fn property7_determinize_is_deterministic_and_equivalent() {
    let ambiguous = lit("a").union(&lit("a"));
    let det = ambiguous.determinize(&|s, w| (s, w), &wfst_core::transform::oplus_min);
    for state in &det.states {
        let mut seen_labels = HashSet::new();
        for (label, _) in state.all_transitions() {
            assert!(seen_labels.insert(label.clone()), "determinized state has duplicate label {label:?}");
        }
    }
    assert_eq!(words(&det, 10), words(&ambiguous, 10));
}

#[test]
fn property8_minimize_preserves_language_and_is_idempotent() {
    let lang = lit("a").union(&lit("b")).kleene_closure(wfst_core::ClosureMode::Star);
    let min1 = lang.minimize();
    let min2 = min1.minimize();
    assert_eq!(min1.num_states(), min2.num_states());
    let small_words: Vec<_> = lang.words_cheapest().take(5).collect();
    let min_words: Vec<_> = min1.words_cheapest().take(5).collect();
    assert_eq!(small_words, min_words);
}

#[test]
fn property9_push_weights_preserves_total_cost() {
    let weighted_a = Fst::single_label(Label::mono(sym("a")), Weight(3.0));
    let weighted_b = Fst::single_label(Label::mono(sym("a")), Weight(1.0));
    let fst = weighted_a.union(&weighted_b);
    let before = fst.words_nbest(1);
    let after = fst.push_weights().words_nbest(1);
    assert_eq!(before, after);
}

#[test]
fn property10_epsilon_removal_drops_epsilon_only_labels() {
    let mut fst = Fst::new();
    let mid = fst.new_state();
    let end = fst.new_state();
    fst.states[fst.initial].add_transition(mid, Label::epsilon(), Weight::ZERO);
    fst.states[mid].add_transition(end, Label::mono(sym("a")), Weight::ZERO);
    fst.finals.insert(end);
    fst.states[end].final_weight = Weight::ZERO;
    fst.alphabet.insert(sym("a"));

    let removed = fst.epsilon_removal();
    for state in &removed.states {
        for (label, _) in state.all_transitions() {
            assert!(!label.is_epsilon());
        }
    }
    assert_eq!(words(&fst, 10), words(&removed, 10));
}

#[test]
fn property11_words_cheapest_monotonic_and_agrees_with_nbest() {
    let fst = lit("a").add_weight(Weight(2.0)).union(&lit("aa").add_weight(Weight(1.0)));
    let all: Vec<_> = fst.words_cheapest().take(2).collect();
    assert!(all[0].0 <= all[1].0);
    assert_eq!(all, fst.words_nbest(2));
}

#[test]
fn rlg_chains_nonterminals_to_the_sink() {
    use std::collections::HashMap;
    use wfst_core::{RlgLhs, RlgRule};

    let mut grammar: HashMap<String, Vec<RlgRule>> = HashMap::new();
    grammar.insert(
        "Start".to_string(),
        vec![RlgRule { lhs: RlgLhs::Acceptor("cat".to_string()), target: "#".to_string(), weight: None }],
    );
    let fst = Fst::rlg(&grammar, "Start").unwrap();

    assert_eq!(words(&fst, 10), HashSet::from(["cat".to_string()]));
}

#[test]
fn rlg_transducer_rule_maps_input_to_output() {
    use std::collections::HashMap;
    use wfst_core::{RlgLhs, RlgRule};

    let mut grammar: HashMap<String, Vec<RlgRule>> = HashMap::new();
    grammar.insert(
        "Start".to_string(),
        vec![RlgRule {
            lhs: RlgLhs::Transducer("cat".to_string(), "dog".to_string()),
            target: "#".to_string(),
            weight: Some(0.5),
        }],
    );
    let fst = Fst::rlg(&grammar, "Start").unwrap();

    let (cost, seq) = fst.words_cheapest().next().unwrap();
    assert_eq!(cost, Weight(0.5));
    let input: String = seq.iter().map(|l| l.0[0].as_ref()).collect();
    let output: String = seq.iter().map(|l| l.last().as_ref()).collect();
    assert_eq!(input, "cat");
    assert_eq!(output, "dog");
}
