use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::Rope;

fn applied(doc: &str, cs: &ChangeSet) -> String {
	let mut rope = Rope::from(doc);
	cs.apply(&mut rope);
	rope.to_string()
}

#[test]
fn test_changeset_retain() {
	let mut cs = ChangeSet::default();
	cs.retain(5);
	assert_eq!(cs.len(), 5);
	assert_eq!(cs.len_after(), 5);
	assert!(cs.is_identity());
}

#[test]
fn test_changeset_delete() {
	let mut cs = ChangeSet::default();
	cs.delete(2);
	cs.retain(3);
	assert_eq!(cs.len(), 5);
	assert_eq!(cs.len_after(), 3);
	assert!(!cs.is_identity());
}

#[test]
fn test_changeset_insert() {
	let mut cs = ChangeSet::default();
	cs.insert("world".into());
	cs.retain(5);
	assert_eq!(cs.len(), 5);
	assert_eq!(cs.len_after(), 10);
}

#[test]
fn test_changeset_apply() {
	let mut cs = ChangeSet::default();
	cs.delete(2);
	cs.insert("aa".into());
	cs.retain(3);
	assert_eq!(applied("hello", &cs), "aallo");
}

#[test]
fn test_insert_keeps_position_after_delete() {
	let mut after = ChangeSet::default();
	after.delete(2);
	after.insert("aa".into());
	after.retain(3);

	let mut before = ChangeSet::default();
	before.insert("a".into());
	before.insert("a".into());
	before.delete(1);
	before.delete(1);
	before.retain(3);

	assert!(matches!(after.changes(), [Operation::Delete(2), Operation::Insert(_), Operation::Retain(3)]));
	assert!(matches!(before.changes(), [Operation::Insert(_), Operation::Delete(2), Operation::Retain(3)]));
	assert_eq!(applied("hello", &after), applied("hello", &before));

	// A concurrent insertion at 0 only ties with text inserted at 0.
	let x = ChangeSet::insert_text(5, 0, "x").unwrap();
	assert_eq!(applied("aallo", &x.map(&after, Bias::Right).unwrap()), "xaallo");
	assert_eq!(applied("aallo", &x.map(&before, Bias::Right).unwrap()), "aaxllo");
}

#[test]
fn test_empty_is_identity() {
	let cs = ChangeSet::empty(4);
	assert!(cs.is_identity());
	assert_eq!(applied("abcd", &cs), "abcd");
	assert!(ChangeSet::empty(0).is_empty());
}

#[test]
fn test_from_changes() {
	let cs = ChangeSet::from_changes(11, [
		Change::replace(0, 5, "hi"),
		Change::insert(5, ","),
		Change::delete(5, 6),
	])
	.unwrap();
	assert_eq!(applied("hello world", &cs), "hi,world");
	assert_eq!(cs.len(), 11);
	assert_eq!(cs.len_after(), 8);
}

#[test]
fn test_insertions_at_same_position_keep_order() {
	let cs = ChangeSet::from_changes(2, [Change::insert(1, "x"), Change::insert(1, "y")]).unwrap();
	assert_eq!(applied("ab", &cs), "axyb");
}

#[rstest]
#[case::past_end(Change::insert(6, "x"))]
#[case::inverted(Change::delete(3, 2))]
#[case::end_past_len(Change::delete(4, 9))]
fn test_from_changes_rejects_invalid(#[case] change: Change) {
	let err = ChangeSet::from_changes(5, [change]).unwrap_err();
	assert!(matches!(err, ChangeError::InvalidChange { len: 5, .. }));
}

#[test]
fn test_from_changes_rejects_unsorted() {
	let err = ChangeSet::from_changes(5, [Change::delete(3, 4), Change::delete(1, 2)]).unwrap_err();
	assert_eq!(err, ChangeError::InvalidChange { start: 1, end: 2, len: 5 });
}

#[test]
fn test_compose() {
	let a = ChangeSet::insert_text(5, 5, " world").unwrap();
	let b = ChangeSet::delete_range(11, 0, 1).unwrap();
	let composed = a.clone().compose(b.clone()).unwrap();
	assert_eq!(applied("hello", &composed), "ello world");
	assert_eq!(applied(&applied("hello", &a), &b), "ello world");
}

#[test]
fn test_compose_deletes_inserted_text() {
	let a = ChangeSet::insert_text(3, 1, "xyz").unwrap();
	let b = ChangeSet::delete_range(6, 2, 4).unwrap();
	let composed = a.compose(b).unwrap();
	assert_eq!(applied("abc", &composed), "axbc");
	assert_eq!(composed, ChangeSet::insert_text(3, 1, "x").unwrap());
}

#[test]
fn test_compose_length_mismatch() {
	let a = ChangeSet::insert_text(3, 0, "x").unwrap();
	let b = ChangeSet::empty(3);
	assert_eq!(a.compose(b), Err(ChangeError::LengthMismatch { expected: 4, actual: 3 }));
}

#[rstest]
#[case::left(Bias::Left, "abX")]
#[case::right(Bias::Right, "baX")]
fn test_map_tie_break(#[case] bias: Bias, #[case] expected: &str) {
	let a = ChangeSet::insert_text(1, 0, "a").unwrap();
	let b = ChangeSet::insert_text(1, 0, "b").unwrap();

	let mapped = a.map(&b, bias).unwrap();
	assert_eq!(applied(&applied("X", &b), &mapped), expected);
}

#[test]
fn test_map_through_overlapping_delete() {
	// "hello world": a deletes "lo w", b replaces "o wor" with "0"
	let a = ChangeSet::delete_range(11, 3, 7).unwrap();
	let b = ChangeSet::from_changes(11, [Change::replace(4, 9, "0")]).unwrap();

	let a2 = a.map(&b, Bias::Right).unwrap();
	let b2 = b.map(&a, Bias::Left).unwrap();

	let via_b = applied(&applied("hello world", &b), &a2);
	let via_a = applied(&applied("hello world", &a), &b2);
	assert_eq!(via_b, "hel0ld");
	assert_eq!(via_a, via_b);
}

#[test]
fn test_map_length_mismatch() {
	let a = ChangeSet::empty(3);
	let b = ChangeSet::empty(4);
	assert_eq!(a.map(&b, Bias::Left), Err(ChangeError::LengthMismatch { expected: 4, actual: 3 }));
}

#[test]
fn test_map_pos() {
	let cs = ChangeSet::from_changes(11, [Change::insert(0, "!! "), Change::delete(5, 6)]).unwrap();
	assert_eq!(cs.map_pos(0, Bias::Left), 0);
	assert_eq!(cs.map_pos(0, Bias::Right), 3);
	assert_eq!(cs.map_pos(5, Bias::Right), 8);
	assert_eq!(cs.map_pos(6, Bias::Right), 8);
	assert_eq!(cs.map_pos(11, Bias::Right), 13);
}

#[test]
fn test_to_changes() {
	let changes = vec![Change::replace(0, 5, "hi"), Change::insert(7, "!"), Change::delete(8, 10)];
	let cs = ChangeSet::from_changes(11, changes.clone()).unwrap();
	assert_eq!(cs.to_changes(), changes);
	assert_eq!(ChangeSet::from_changes(11, cs.to_changes()).unwrap(), cs);
}

#[test]
fn test_invert() {
	let doc = Rope::from("hello world");
	let cs = ChangeSet::from_changes(11, [Change::replace(0, 5, "bye")]).unwrap();
	let undo = cs.invert(&doc);
	assert_eq!(undo.len(), cs.len_after());
	assert_eq!(applied("bye world", &undo), "hello world");
}

#[test]
fn test_serde_rederives_lengths() {
	let cs = ChangeSet::from_changes(5, [Change::replace(1, 3, "éé")]).unwrap();
	let json = serde_json::to_string(&cs).unwrap();
	assert_eq!(json, r#"[{"retain":1},{"insert":"éé"},{"delete":2},{"retain":2}]"#);

	let back: ChangeSet = serde_json::from_str(&json).unwrap();
	assert_eq!(back, cs);
	assert_eq!(back.len_after(), 5);
}

/// Generates a random ASCII document of variable length.
fn arb_document() -> impl Strategy<Value = String> {
	"[ -~\n]{0,200}"
}

/// Generates a sorted, non-overlapping list of changes for a document.
fn arb_changes(doc_len: usize) -> BoxedStrategy<Vec<Change>> {
	let text = "[a-z\u{e9}\u{1f600}]{0,8}";
	if doc_len == 0 {
		prop::collection::vec(prop::option::of(text), 0..3)
			.prop_map(|items| {
				items
					.into_iter()
					.map(|replacement| Change {
						start: 0,
						end: 0,
						replacement,
					})
					.collect()
			})
			.boxed()
	} else {
		prop::collection::vec((0..=doc_len, 0..=10usize, prop::option::of(text)), 0..5)
			.prop_map(move |mut items| {
				// Sort by start position and make non-overlapping
				items.sort_by_key(|(pos, _, _)| *pos);
				let mut changes = Vec::new();
				let mut last_end = 0;

				for (pos, delete_len, replacement) in items {
					let start = pos.max(last_end);
					let end = (start + delete_len).min(doc_len);
					changes.push(Change {
						start,
						end,
						replacement,
					});
					last_end = end;
				}
				changes
			})
			.boxed()
	}
}

/// A document plus two change sets built concurrently against it.
fn arb_concurrent() -> impl Strategy<Value = (String, ChangeSet, ChangeSet)> {
	arb_document().prop_flat_map(|doc| {
		let len = doc.chars().count();
		(Just(doc), arb_changes(len), arb_changes(len)).prop_map(move |(doc, a, b)| {
			let a = ChangeSet::from_changes(len, a).unwrap();
			let b = ChangeSet::from_changes(len, b).unwrap();
			(doc, a, b)
		})
	})
}

/// A document plus three change sets: `a` and `b` concurrent, `c` after `b`.
fn arb_concurrent_then_sequential() -> impl Strategy<Value = (String, ChangeSet, ChangeSet, ChangeSet)> {
	arb_concurrent().prop_flat_map(|(doc, a, b)| {
		let after_b = b.len_after();
		(Just(doc), Just(a), Just(b), arb_changes(after_b)).prop_map(move |(doc, a, b, c)| {
			let c = ChangeSet::from_changes(after_b, c).unwrap();
			(doc, a, b, c)
		})
	})
}

#[test]
fn test_map_through_replacement_then_delete() {
	// "abc": b replaces "c" with "X", then c deletes "ab".
	let a = ChangeSet::insert_text(3, 0, "d").unwrap();
	let b = ChangeSet::from_changes(3, [Change::replace(2, 3, "X")]).unwrap();
	let c = ChangeSet::delete_range(3, 0, 2).unwrap();

	let bc = b.clone().compose(c.clone()).unwrap();
	assert!(matches!(bc.changes(), [Operation::Delete(2), Operation::Insert(_), Operation::Delete(1)]));

	let stepwise = a.map(&b, Bias::Right).unwrap().map(&c, Bias::Right).unwrap();
	let at_once = a.map(&bc, Bias::Right).unwrap();
	assert_eq!(stepwise, at_once);
	assert_eq!(applied(&applied("abc", &bc), &at_once), "dX");
}

proptest! {
	/// Undo round-trip: `apply cs`, then `apply cs.invert()` restores original content.
	#[test]
	fn prop_undo_roundtrip((doc, cs, _) in arb_concurrent()) {
		let original = Rope::from(doc.as_str());
		let mut modified = original.clone();
		cs.apply(&mut modified);
		cs.invert(&original).apply(&mut modified);
		prop_assert_eq!(modified.to_string(), doc);
	}

	/// Composition is equivalent to sequential application.
	#[test]
	fn prop_compose_matches_sequential((doc, _, b, c) in arb_concurrent_then_sequential()) {
		let sequential = applied(&applied(&doc, &b), &c);
		let composed = b.compose(c).unwrap();
		prop_assert_eq!(applied(&doc, &composed), sequential);
	}

	/// Convergence: both application orders produce the same document.
	#[test]
	fn prop_map_converges((doc, a, b) in arb_concurrent()) {
		let a_after_b = a.map(&b, Bias::Right).unwrap();
		let b_after_a = b.map(&a, Bias::Left).unwrap();

		prop_assert_eq!(a_after_b.len(), b.len_after());
		prop_assert_eq!(b_after_a.len(), a.len_after());

		let via_b = applied(&applied(&doc, &b), &a_after_b);
		let via_a = applied(&applied(&doc, &a), &b_after_a);
		prop_assert_eq!(via_b, via_a);
	}

	/// Mapping through `b` then `c` equals mapping through `b` composed with `c`.
	#[test]
	fn prop_map_through_composition((_doc, a, b, c) in arb_concurrent_then_sequential()) {
		let stepwise = a.map(&b, Bias::Right).unwrap().map(&c, Bias::Right).unwrap();
		let at_once = a.map(&b.compose(c).unwrap(), Bias::Right).unwrap();
		prop_assert_eq!(stepwise, at_once);
	}

	/// Mapping through pure insertions and then through their inverse is lossless.
	#[test]
	fn prop_map_through_insertions_and_back((doc, a, b) in arb_concurrent()) {
		let insertions: Vec<Change> = b
			.to_changes()
			.into_iter()
			.filter_map(|change| change.replacement.map(|text| Change::insert(change.start, text)))
			.collect();
		let x = ChangeSet::from_changes(b.len(), insertions).unwrap();
		let x_inverse = x.invert(&Rope::from(doc.as_str()));

		let there = a.map(&x, Bias::Left).unwrap();
		let back = there.map(&x_inverse, Bias::Left).unwrap();
		prop_assert_eq!(back, a);
	}

	/// Flattening into changes and rebuilding is lossless.
	#[test]
	fn prop_to_changes_roundtrip((_doc, a, _) in arb_concurrent()) {
		let rebuilt = ChangeSet::from_changes(a.len(), a.to_changes()).unwrap();
		prop_assert_eq!(rebuilt, a);
	}
}
