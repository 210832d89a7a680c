//! Property tests for queries built from arbitrary user ids.

use farm_xml::{literal, Directives, Document};
use proptest::prelude::*;

proptest! {
    /// Property: any id written by directives is found again through `literal()`.
    #[test]
    fn prop_literal_finds_written_id(id in "[a-zA-Z0-9 '\"&<>._-]{1,24}") {
        let mut doc = Document::with_root("people");
        doc.apply(
            &Directives::new()
                .xpath("/people")
                .add("person")
                .attr("id", &id),
        )
        .unwrap();

        let reparsed = Document::parse(&doc.to_string()).unwrap();
        let query = format!("/people/person[@id={}]/@id", literal(&id));
        prop_assert_eq!(reparsed.xpath(&query).unwrap(), vec![id.clone()]);
    }

    /// Property: `sum()` over numeric children equals the arithmetic sum.
    #[test]
    fn prop_sum_matches(values in proptest::collection::vec(0u32..10_000, 0..20)) {
        let mut dirs = Directives::new().xpath("/people");
        for value in &values {
            dirs = dirs.add("person").add("reputation").set(value).up().up();
        }
        let mut doc = Document::with_root("people");
        doc.apply(&dirs).unwrap();

        let expected: u64 = values.iter().map(|v| u64::from(*v)).sum();
        prop_assert_eq!(
            doc.xpath("sum(/people/person/reputation)").unwrap(),
            vec![expected.to_string()]
        );
    }
}

#[test]
fn test_unparseable_query_is_an_error() {
    let doc = Document::with_root("people");
    assert!(doc.xpath("/people/person[@id='x'").is_err());
}
