use cuddle::{DataType, Document, Pool, Reader};
use rstest::rstest;

#[rstest]
fn property_order_and_overwrite() {
    let mut doc = Document::new();
    let n = doc.add_node(None, "n");
    let one = doc.add_integer(1);
    let two = doc.add_integer(2);
    doc.set_property(n, "b", one);
    doc.set_property(n, "a", two);

    let keys: Vec<&str> = doc.properties(n).iter().map(|p| doc.key(*p)).collect();
    assert_eq!(keys, ["a", "b"]);

    let three = doc.add_integer(3);
    doc.set_property(n, "a", three);
    assert_eq!(doc.properties(n).len(), 2);
    assert_eq!(doc.property(n, "a"), Some(three));
    assert_eq!(doc.properties(n)[0].value(), three);
}

#[rstest]
fn keys_sort_by_code_point() {
    let mut doc = Document::new();
    let n = doc.add_node(None, "n");
    for key in ["é", "Z", "a", "_", "10", "2"] {
        let value = doc.add_null();
        doc.set_property(n, key, value);
    }
    let keys: Vec<&str> = doc.properties(n).iter().map(|p| doc.key(*p)).collect();
    assert_eq!(keys, ["10", "2", "Z", "_", "a", "é"]);
}

#[rstest]
fn mutating_a_parsed_document() {
    let mut doc = cuddle::parse("config { old 1; }").unwrap();
    let config = doc.nodes()[0];
    let old = doc.children(config)[0];

    doc.rename(old, "renamed");
    doc.annotate(config, "section");
    let extra = doc.add_node(Some(config), "extra");
    let flag = doc.add_bool(true);
    doc.add_argument(extra, flag);
    let two = doc.add_integer(2);
    doc.add_argument(old, two);

    assert_eq!(
        doc.to_string(),
        "(section)config {\n    renamed 1 2\n    extra true\n}\n"
    );
}

#[rstest]
fn equality_is_structural() {
    let parsed = cuddle::parse("a 1 k=\"v\" { b; }").unwrap();

    let mut built = Document::new();
    let a = built.add_node(None, "a");
    let k = built.add_string("v");
    built.set_property(a, "k", k);
    let one = built.add_integer(1);
    built.add_argument(a, one);
    built.add_node(Some(a), "b");

    assert_eq!(parsed, built);

    built.annotate(a, "x");
    assert_ne!(parsed, built);
}

#[rstest]
fn value_kind_matters_for_equality() {
    let integer = cuddle::parse("n 1").unwrap();
    let string = cuddle::parse("n \"1\"").unwrap();
    assert_ne!(integer, string);
}

#[rstest]
fn keyword_values_accept_any_case() {
    let mut doc = Document::new();
    let value = doc.add_value(DataType::Keyword, "Null", None);
    assert_eq!(doc.value_data(value), "null");
}

#[rstest]
#[should_panic]
fn non_finite_reals_are_rejected() {
    Document::new().add_real(f64::NAN);
}

#[rstest]
fn pooled_parse_cycle() {
    let mut pool = Pool::new();
    for round in 0..3 {
        let mut doc = Document::new_in(&mut pool);
        let mut reader = Reader::with_pool("a 1; b { c; }", &mut pool);
        doc.read(&mut reader).unwrap();
        reader.release(&mut pool);

        assert_eq!(doc.nodes().len(), 2, "round {round}");
        assert_eq!(doc.node_count(), 3);
        doc.release(&mut pool);
    }
    assert_eq!(pool.retained_documents(), 1);
    assert_eq!(pool.retained_buffers(), 1);
}

#[rstest]
fn pooled_streaming_parse_cycle() {
    let mut pool = Pool::new();
    for round in 0..3 {
        let mut doc = Document::new_in(&mut pool);
        let mut reader = Reader::from_read_in("a 1\nb \"two\"".as_bytes(), &mut pool);
        assert_eq!(pool.retained_buffers(), 0, "round {round}");
        doc.read(&mut reader).unwrap();
        reader.release(&mut pool);

        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.value_data(doc.arguments(doc.nodes()[1])[0]), "two");
        doc.release(&mut pool);
        assert_eq!(pool.retained_buffers(), 1);
    }
}

#[rstest]
fn clear_resets_everything() {
    let mut doc = cuddle::parse("a 1 k=2 { b; }").unwrap();
    doc.clear();
    assert!(doc.nodes().is_empty());
    assert_eq!(doc.value_count(), 0);
    doc.read(&mut Reader::new("fresh")).unwrap();
    assert_eq!(doc.name(doc.nodes()[0]), "fresh");
}
