//! Snapshot of canonical unparser output over a fixed ARI corpus, so an
//! unintentional change in the canonical text form shows up as a diff
//! instead of silently changing on-disk/on-wire output.

use ace::text;

fn canonicalize(input: &str) -> String {
    text::unparse(&text::parse(input).unwrap())
}

#[test]
fn canonical_forms_for_fixed_corpus() {
    let corpus = [
        "ari:/undefined",
        "ari:/NULL",
        "ari:/bool.TRUE",
        "ari:/uvast.5",
        "ari:/int8.-9",
        "ari:/3.5",
        "ari:/\"hello world\"",
        "ari:/h'DEADBEEF'",
        "ari:/tp.1000",
        "ari:/label.!9",
        "ari:/AC(1,2,3)",
        "ari:/am(1=2)",
        "ari:/TBL(c=2;1,2;3,4)",
        "ari:/execset(1;2,3)",
        "ari:/!7/ctrl.!3()",
        "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UINT.2)",
    ];
    let canonical: Vec<String> = corpus.iter().map(|s| canonicalize(s)).collect();
    insta::assert_debug_snapshot!(canonical);
}

#[test]
fn canonicalization_is_idempotent() {
    let corpus = [
        "ari:/bool.TRUE",
        "ari:/uvast.5",
        "ari:/h'DEADBEEF'",
        "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UINT.2)",
    ];
    for input in corpus {
        let once = canonicalize(input);
        let twice = canonicalize(&once);
        assert_eq!(once, twice);
    }
}
