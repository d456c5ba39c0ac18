//! Table-driven round-trip and error-position cases across the text and
//! binary codecs, plus the transcoder's resolution behavior against a
//! small catalog.

use rstest::rstest;

use ace::catalog::{Adm, Catalog};
use ace::registry::ObjectType;
use ace::transcoder::{Form, Input};
use ace::{text, AceError, Transcoder};

fn sample_catalog() -> Catalog {
    let mut adm = Adm::new("example", 42);
    adm.define(1, "num_tx", ObjectType::Edd, vec![]);
    adm.define(2, "reset", ObjectType::Ctrl, vec!["iface".into()]);
    let mut cat = Catalog::new();
    cat.add_adm(adm).unwrap();
    cat
}

#[rstest]
#[case("ari:/undefined")]
#[case("ari:/NULL")]
#[case("ari:/BOOL.true")]
#[case("ari:/BOOL.false")]
#[case("ari:/5")]
#[case("ari:/INT8.-12")]
#[case("ari:/UINT8.200")]
#[case("ari:/VAST.-9")]
#[case("ari:/UVAST.9")]
#[case("ari:/3.5")]
#[case("ari:/REAL32.1.0")]
#[case("ari:/\"hello\"")]
#[case("ari:/h'0102ff'")]
#[case("ari:/TP.1000")]
#[case("ari:/TD.1000")]
#[case("ari:/TP.2023-06-02T12:34:56Z")]
#[case("ari:/TD.P1DT2H")]
#[case("ari:/LABEL.!4")]
#[case("ari:/LABEL.foo")]
#[case("ari:/AC()")]
#[case("ari:/AC(1,2,3)")]
#[case("ari:/AM()")]
#[case("ari:/AM(1=2,3=4)")]
#[case("ari:/TBL(c=2;1,2;3,4)")]
#[case("ari:/EXECSET(1;2,3)")]
#[case("ari:/RPTSET(1,2;3,4,5)")]
#[case("ari:/!7/CTRL.!3()")]
fn text_round_trips_through_parse_and_unparse(#[case] input: &str) {
    let value = text::parse(input).unwrap();
    let reparsed = text::parse(&text::unparse(&value)).unwrap();
    assert_eq!(value, reparsed);
}

// Nested (non-top-level) scalars are encoded bare and come back as
// `Value::Int64`/`Value::Real64` regardless of their original width; these
// cases use `INT64.` explicitly so the round trip is exact.
#[rstest]
#[case("ari:/undefined")]
#[case("ari:/NULL")]
#[case("ari:/BOOL.true")]
#[case("ari:/5")]
#[case("ari:/UVAST.9")]
#[case("ari:/\"hello\"")]
#[case("ari:/h'0102ff'")]
#[case("ari:/AC()")]
#[case("ari:/AC(INT64.1,INT64.2,INT64.3)")]
#[case("ari:/TBL(c=2;INT64.1,INT64.2;INT64.3,INT64.4)")]
#[case("ari:/EXECSET(INT64.1;INT64.2,INT64.3)")]
// A container nested inside another container still carries its
// `[code, payload]` wrapper, so it round-trips exactly even nested.
#[case("ari:/AC(TBL(c=2;INT64.1,INT64.2,INT64.3,INT64.4))")]
#[case("ari:/RPTSET(INT64.1,TP.1000;TP.1001,INT64.7,INT64.9)")]
fn text_value_round_trips_through_cbor(#[case] input: &str) {
    let cat = Catalog::new();
    let tc = Transcoder::new(&cat);
    let value = text::parse(input).unwrap();
    let bytes = tc.encode(Form::Cbor, &value).unwrap().into_bytes().unwrap();
    let back = tc.decode(Form::Cbor, Input::Bytes(&bytes)).unwrap();
    assert_eq!(value, back);
}

/// `ari:/undefined` is the one top-level value carried as a bare CBOR
/// simple value (`0xF7`), with no ARI tag wrapper.
#[test]
fn undefined_encodes_to_bare_f7() {
    let cat = Catalog::new();
    let tc = Transcoder::new(&cat);
    let bytes = tc.encode(Form::Cbor, &text::parse("ari:/undefined").unwrap()).unwrap().into_bytes().unwrap();
    assert_eq!(bytes, vec![0xF7]);
}

#[test]
fn obj_ref_round_trips_through_cbor_via_catalog_resolution() {
    let cat = sample_catalog();
    let tc = Transcoder::new(&cat);

    let text_in = "ari:/example/CTRL.reset(\"eth0\")";
    let bytes = tc.transcode(Form::Text, Input::Text(text_in), Form::Cbor, false, false).unwrap();
    let back = tc.transcode(Form::Cbor, Input::Bytes(&bytes.into_bytes().unwrap()), Form::Text, false, false).unwrap();
    assert_eq!(back.into_text().unwrap(), text_in);
}

#[test]
fn unknown_namespace_is_left_unresolved_when_resolution_is_advisory() {
    let cat = Catalog::new();
    let tc = Transcoder::new(&cat);
    let value = text::parse("ari:/nope/EDD.thing").unwrap();
    assert!(tc.resolve(value, false, false).is_ok());
}

#[test]
fn unknown_namespace_is_a_resolution_error_when_changing_wire_forms() {
    let cat = Catalog::new();
    let tc = Transcoder::new(&cat);
    let err = tc
        .transcode(Form::Text, Input::Text("ari:/nope/EDD.thing"), Form::Cbor, false, false)
        .unwrap_err();
    assert!(matches!(err, AceError::Resolution { .. }));
}

#[test]
fn truncated_cbor_params_is_a_decode_error_past_the_last_byte() {
    let cat = sample_catalog();
    let tc = Transcoder::new(&cat);
    let bytes = tc
        .transcode(Form::Text, Input::Text("ari:/example/CTRL.reset(\"eth0\")"), Form::Cbor, false, false)
        .unwrap()
        .into_bytes()
        .unwrap();
    let truncated = &bytes[..bytes.len() - 1];
    let err = tc.decode(Form::Cbor, Input::Bytes(truncated)).unwrap_err();
    assert!(matches!(err, AceError::Decode { .. }));
}

#[rstest]
#[case("ari:FROB")]
#[case("ari:/FROB.1")]
#[case("ari:/AC(")]
#[case("ari:/TBL(c=2;1,2,3)")]
fn malformed_text_is_rejected(#[case] input: &str) {
    assert!(text::parse(input).is_err());
}
