//! Step normalization.
//!
//! Callers may submit steps in any order, with gaps or repeated `order`
//! values. Before persistence they are put into canonical form: sorted by
//! `order`, then renumbered `0..N`.

use crate::model::{NewStep, Step};

/// Sort steps by `order` and renumber them to their position.
///
/// The sort is stable, so steps sharing an `order` value keep their input
/// sequence. The original `order` values are discarded.
pub fn normalize_steps(mut steps: Vec<NewStep>) -> Vec<Step> {
    steps.sort_by(|a, b| a.order.cmp(&b.order));
    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| Step {
            title: step.title,
            description: step.description,
            order: index as u64,
        })
        .collect()
}

/// True if `order` values are exactly `0..N` in sequence.
pub fn is_canonical(steps: &[Step]) -> bool {
    steps
        .iter()
        .enumerate()
        .all(|(index, step)| step.order == index as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderKey;

    fn steps(pairs: &[(&str, u64)]) -> Vec<NewStep> {
        pairs.iter().map(|(title, order)| NewStep::new(*title, *order)).collect()
    }

    fn big(digits: &str) -> OrderKey {
        OrderKey::from_digits(digits).unwrap()
    }

    fn titles(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(|s| s.title.as_str()).collect()
    }

    /// Small deterministic corpus of inputs with gaps, duplicates and
    /// reversed runs.
    fn corpus() -> Vec<Vec<NewStep>> {
        let mut out = vec![Vec::new()];
        for n in 1..=6u64 {
            out.push((0..n).map(|i| NewStep::new(format!("s{i}"), i)).collect());
            out.push((0..n).rev().map(|i| NewStep::new(format!("r{i}"), i * 7)).collect());
            out.push((0..n).map(|i| NewStep::new(format!("d{i}"), i % 2)).collect());
            out.push((0..n).map(|i| NewStep::new(format!("g{i}"), (i * 31 + 5) % 11)).collect());
        }
        out
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize_steps(Vec::new()).is_empty());
    }

    #[test]
    fn sorts_by_order_and_renumbers() {
        let out = normalize_steps(steps(&[("B", 5), ("A", 2)]));
        assert_eq!(titles(&out), ["A", "B"]);
        assert_eq!(out[0].order, 0);
        assert_eq!(out[1].order, 1);
    }

    #[test]
    fn closes_gaps() {
        let out = normalize_steps(steps(&[("a", 10), ("b", 20), ("c", 1000)]));
        assert_eq!(titles(&out), ["a", "b", "c"]);
        assert!(is_canonical(&out));
    }

    #[test]
    fn equal_orders_keep_input_sequence() {
        let out = normalize_steps(steps(&[("x", 3), ("first", 1), ("second", 1), ("third", 1)]));
        assert_eq!(titles(&out), ["first", "second", "third", "x"]);
    }

    #[test]
    fn orders_beyond_u64_sort_after_smaller_ones() {
        let input = vec![
            NewStep::new("bigger", big("100000000000000000001")),
            NewStep::new("big", big("100000000000000000000")),
            NewStep::new("max", u64::MAX),
            NewStep::new("small", 5u64),
        ];
        let out = normalize_steps(input);
        assert_eq!(titles(&out), ["small", "max", "big", "bigger"]);
        assert!(is_canonical(&out));
    }

    #[test]
    fn preserves_descriptions() {
        let input = vec![
            NewStep::new("late", 9u64).description("after"),
            NewStep::new("early", 0u64).description("before"),
        ];
        let out = normalize_steps(input);
        assert_eq!(out[0].description, "before");
        assert_eq!(out[1].description, "after");
    }

    #[test]
    fn output_is_always_canonical() {
        for input in corpus() {
            let n = input.len();
            let out = normalize_steps(input);
            assert_eq!(out.len(), n);
            assert!(is_canonical(&out), "not canonical: {out:?}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in corpus() {
            let once = normalize_steps(input);
            let twice = normalize_steps(once.iter().cloned().map(NewStep::from).collect());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn is_canonical_detects_gaps() {
        assert!(is_canonical(&[]));
        assert!(!is_canonical(&[Step::new("a", 0), Step::new("b", 2)]));
        assert!(!is_canonical(&[Step::new("a", 1)]));
    }
}
