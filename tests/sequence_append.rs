//! Building sequences: construction, the append family and their failures.

use std::any::Any;

use connect_sequence::{Handler, HandlerKind, Sequence, SequenceError};

type H = Handler<(), (), String>;
type Seq = Sequence<(), (), String>;

fn noop(name: &'static str) -> H {
    H::normal(|_, _, next| next.proceed()).named(name)
}

fn recover(name: &'static str) -> H {
    H::error(|_, _, _, next| next.proceed()).named(name)
}

fn empty() -> Seq {
    Seq::new((), (), |_| {})
}

fn names(seq: &Seq) -> Vec<String> {
    seq.names().map(str::to_string).collect()
}

fn boxed(value: impl Any) -> Box<dyn Any> {
    Box::new(value)
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn builder_with_two_of_three_parts_is_missing_an_argument() {
    let result = Seq::builder().request(()).response(()).build();
    assert!(matches!(result, Err(SequenceError::MissingArgument(_))));

    let result = Seq::builder().build();
    assert_eq!(result.err(), Some(SequenceError::missing("request")));
}

#[test]
fn new_sequence_starts_empty() {
    let seq = empty();
    assert!(seq.is_empty());
    assert_eq!(seq.len(), 0);
}

// ============================================================================
// APPEND
// ============================================================================

#[test]
fn append_grows_by_one_per_handler() {
    let mut seq = empty();
    seq.append(noop("a")).unwrap();
    assert_eq!(seq.len(), 1);
    seq.append(noop("b")).unwrap().append(noop("c")).unwrap();
    assert_eq!(seq.len(), 3);
    seq.append_list(Vec::<H>::new()).unwrap();
    assert_eq!(seq.len(), 3);
}

#[test]
fn append_keeps_the_given_order() {
    let mut seq = empty();
    seq.append(noop("mid0")).unwrap();
    seq.append_list([noop("mid1"), noop("mid2")]).unwrap();
    seq.append_list(Vec::<H>::new()).unwrap();
    seq.append_list([noop("mid3"), recover("mid4"), noop("mid5")]).unwrap();
    seq.append(noop("mid6")).unwrap();

    assert_eq!(names(&seq), vec!["mid0", "mid1", "mid2", "mid3", "mid4", "mid5", "mid6"]);
    assert_eq!(seq.kinds().filter(|kind| *kind == HandlerKind::ErrorHandler).count(), 1);
}

#[test]
fn append_rejects_non_handler_values() {
    let mut seq = empty();

    let err = seq.append(boxed("not a function")).err().unwrap();
    assert!(err.is_invalid_argument());

    let err = seq.append(None::<H>).err().unwrap();
    assert!(err.is_invalid_argument());

    assert!(seq.is_empty());
    seq.append(boxed(noop("boxed"))).unwrap();
    assert_eq!(names(&seq), vec!["boxed"]);
}

#[test]
fn append_list_is_all_or_nothing() {
    let mut seq = empty();

    let result = seq.append_list([boxed(noop("mid1")), boxed("not a function"), boxed(noop("mid3"))]);
    assert!(matches!(result, Err(SequenceError::InvalidArgument(_))));
    assert_eq!(seq.len(), 0);

    seq.append_list([boxed(noop("mid1")), boxed(noop("mid3"))]).unwrap();
    assert_eq!(names(&seq), vec!["mid1", "mid3"]);
}

#[test]
fn append_list_of_options_fails_on_first_none() {
    let mut seq = empty();
    let result = seq.append_list([Some(noop("a")), None, Some(noop("c"))]);

    assert_eq!(result.err(), Some(SequenceError::invalid("expected a handler, found none")));
    assert!(seq.is_empty());
}

#[test]
fn append_list_dyn_accepts_only_lists() {
    let mut seq = empty();

    for value in [boxed("not an array"), boxed(42_u32), boxed(noop("single"))] {
        let err = seq.append_list_dyn(value).err().unwrap();
        assert!(err.is_invalid_argument(), "{err}");
    }
    assert!(seq.is_empty());

    seq.append_list_dyn(boxed(vec![noop("a"), noop("b")])).unwrap();
    seq.append_list_dyn(boxed(vec![boxed(noop("c"))])).unwrap();
    assert_eq!(names(&seq), vec!["a", "b", "c"]);

    let err = seq
        .append_list_dyn(boxed(vec![boxed(noop("d")), boxed(1_u8)]))
        .err()
        .unwrap();
    assert!(err.is_invalid_argument());
    assert_eq!(seq.len(), 3);
}

// ============================================================================
// APPEND_IF
// ============================================================================

#[test]
fn append_if_without_handlers_is_missing_an_argument() {
    let mut seq = empty();
    let err = seq.append_if(|_| true, Vec::<H>::new()).err().unwrap();

    assert!(err.is_missing_argument());
    assert!(seq.is_empty());
}

#[test]
fn append_if_rejects_non_handlers_atomically() {
    let mut seq = empty();
    let err = seq
        .append_if(|_| true, [boxed(noop("a")), boxed("not a function")])
        .err()
        .unwrap();

    assert!(err.is_invalid_argument());
    assert!(seq.is_empty());
}

#[test]
fn append_if_appends_every_handler_in_order() {
    let mut seq = empty();
    seq.append(noop("before"))
        .unwrap()
        .append_if(|_| false, [noop("gated"), recover("gated_recover")])
        .unwrap()
        .append(noop("after"))
        .unwrap();

    assert_eq!(names(&seq), vec!["before", "gated", "gated_recover", "after"]);
}
