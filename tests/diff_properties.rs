use proptest::prelude::*;
use std::collections::BTreeMap;

use covdiff::coverage::{diff, floor_percentage, CoverageSnapshot, FileSummary};

fn percentage() -> impl Strategy<Value = f64> {
    (0u64..=50, 1u64..=50).prop_map(|(covered, total)| floor_percentage(covered.min(total), total))
}

fn snapshot() -> impl Strategy<Value = BTreeMap<String, (f64, f64)>> {
    prop::collection::btree_map("[a-e]{1,2}\\.rb", (percentage(), percentage()), 0..8)
}

fn build(files: &BTreeMap<String, (f64, f64)>) -> CoverageSnapshot {
    files
        .iter()
        .rev()
        .map(|(filename, (lines, branches))| FileSummary {
            filename: filename.clone(),
            lines: *lines,
            branches: *branches,
        })
        .collect()
}

proptest! {
    #[test]
    fn diff_with_itself_is_empty(files in snapshot()) {
        let snapshot = build(&files);
        prop_assert!(diff(&snapshot, &snapshot).unwrap().is_empty());
    }

    #[test]
    fn diff_is_sorted_by_filename(base in snapshot(), head in snapshot()) {
        let diffs = diff(&build(&base), &build(&head)).unwrap();
        prop_assert!(diffs.windows(2).all(|w| w[0].filename < w[1].filename));
    }

    #[test]
    fn missing_side_is_none(base in snapshot(), head in snapshot()) {
        for d in diff(&build(&base), &build(&head)).unwrap() {
            let in_base = base.contains_key(&d.filename);
            let in_head = head.contains_key(&d.filename);
            prop_assert!(in_base || in_head);
            prop_assert_eq!(d.lines.from.is_some(), in_base);
            prop_assert_eq!(d.branches.from.is_some(), in_base);
            prop_assert_eq!(d.lines.to.is_some(), in_head);
            prop_assert_eq!(d.branches.to.is_some(), in_head);
        }
    }

    #[test]
    fn reports_exactly_the_changed_files(base in snapshot(), head in snapshot()) {
        let reported: Vec<String> = diff(&build(&base), &build(&head))
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();

        let mut expected: Vec<String> = base
            .keys()
            .chain(head.keys())
            .filter(|name| base.get(*name) != head.get(*name))
            .cloned()
            .collect();
        expected.sort();
        expected.dedup();

        prop_assert_eq!(reported, expected);
    }

    #[test]
    fn floor_never_overstates(covered in 0u64..10_000, extra in 0u64..10_000) {
        let total = covered + extra;
        let pct = floor_percentage(covered, total);
        prop_assert!((0.0..=100.0).contains(&pct));
        if total > 0 {
            prop_assert!(pct * total as f64 <= covered as f64 * 100.0 + 1e-6);
        }
    }
}
