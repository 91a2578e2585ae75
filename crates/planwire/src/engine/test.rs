use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tracing_test::traced_test;

use crate::{
    DataTypeRef, Error, ErrorKind, Identifiable, OperatorRef, Payload,
    PlanEnvironment, PluginRef, TableRef, TypeDescription, TypeKind,
    envelope::FORMAT_VERSION,
    test_support::{self, Described, Named, Path},
    trait_def::{FieldCollation, PlanTrait, TraitDef},
};

#[derive(Debug, Clone, PartialEq, Identifiable, Payload)]
enum Literal {
    Null,
    Integer(i64),
    Text { value: String, collation: Option<String> },
}

#[derive(Debug, Identifiable, Payload)]
struct Values {
    cluster: Arc<dyn PlanEnvironment>,
    rows: Vec<Vec<Literal>>,
    row_type: DataTypeRef,
    #[payload(skip)]
    digest: Option<String>,
}

#[test]
#[traced_test]
fn platform_values_round_trip() {
    let engine = test_support::engine();

    let value = (
        String::from("plan"),
        Duration::from_millis(1500),
        vec![Some(1u8), None],
        BTreeMap::from([(1u32, 'a'), (2, 'b')]),
    );

    let bytes = engine.serialize(&value).unwrap();
    let decoded: (String, Duration, Vec<Option<u8>>, BTreeMap<u32, char>) =
        engine.deserialize(&bytes).unwrap();

    assert_eq!(bytes[0], FORMAT_VERSION);
    assert_eq!(decoded, value);
}

#[test]
#[traced_test]
fn enums_round_trip_every_variant() {
    let engine = test_support::engine();

    let literals = vec![
        Literal::Null,
        Literal::Integer(-3),
        Literal::Text { value: "x".into(), collation: Some("C".into()) },
    ];

    let bytes = engine.serialize(&literals).unwrap();
    assert_eq!(engine.deserialize::<Vec<Literal>>(&bytes).unwrap(), literals);
}

#[test]
#[traced_test]
fn environment_reference_is_injected() {
    let engine = test_support::engine();
    let cluster = Arc::clone(engine.context().environment());

    let values = Values {
        cluster: Arc::clone(&cluster),
        rows: vec![vec![Literal::Integer(1)]],
        row_type: DataTypeRef::new(Arc::new(Described(
            TypeDescription::scalar(TypeKind::BigInt),
        ))),
        digest: Some("cached".into()),
    };

    let bytes = engine.serialize(&values).unwrap();
    let decoded = engine.deserialize::<Values>(&bytes).unwrap();

    assert!(Arc::ptr_eq(&decoded.cluster, &cluster));
    assert_eq!(decoded.rows, values.rows);
    assert_eq!(decoded.row_type, values.row_type);
    assert_eq!(decoded.digest, None);
}

#[test]
#[traced_test]
fn category_handles_resolve_through_the_environment() {
    let engine = test_support::engine();

    let value = (
        OperatorRef::new(Arc::new(Named("AND"))),
        PluginRef::new(Arc::new(Named("dfs"))),
        TableRef::new(Arc::new(Path(vec!["sys".into(), "nodes".into()]))),
        DataTypeRef::new(Arc::new(Described(TypeDescription::decimal(10, 2)))),
    );

    let bytes = engine.serialize(&value).unwrap();
    let decoded: (OperatorRef, PluginRef, TableRef, DataTypeRef) =
        engine.deserialize(&bytes).unwrap();

    assert_eq!(decoded, value);
    assert_eq!(decoded.2.qualified_name(), ["sys", "nodes"]);
}

#[test]
#[traced_test]
fn unknown_names_are_resolution_errors() {
    let engine = test_support::engine();

    let bytes =
        engine.serialize(&OperatorRef::new(Arc::new(Named("LIKE")))).unwrap();
    let error = engine.deserialize::<OperatorRef>(&bytes).unwrap_err();
    assert!(matches!(&error, Error::UnknownOperator(name) if name == "LIKE"));
    assert_eq!(error.kind(), ErrorKind::Resolution);

    let bytes = engine
        .serialize(&TableRef::new(Arc::new(Path(vec!["tmp".into()]))))
        .unwrap();
    let error = engine.deserialize::<TableRef>(&bytes).unwrap_err();
    assert!(matches!(error, Error::UnknownTable(path) if path == ["tmp"]));
}

#[test]
#[traced_test]
fn trait_definitions_round_trip() {
    let engine = test_support::engine();

    let traits = (TraitDef::Collation, PlanTrait::Collation(vec![
        FieldCollation::ascending(0),
        FieldCollation::ascending(2),
    ]));

    let bytes = engine.serialize(&traits).unwrap();
    let decoded: (TraitDef, PlanTrait) = engine.deserialize(&bytes).unwrap();

    assert_eq!(decoded, traits);
}

#[test]
#[traced_test]
fn root_type_is_checked() {
    let engine = test_support::engine();
    let bytes = engine.serialize(&7u32).unwrap();

    let error = engine.deserialize::<u64>(&bytes).unwrap_err();
    assert!(matches!(
        error,
        Error::RootTypeMismatch { expected: "u64", found }
            if found == u32::TYPE_KEY
    ));
}

#[test]
#[traced_test]
fn corrupt_envelopes_are_structural_errors() {
    let engine = test_support::engine();
    let bytes = engine.serialize(&String::from("plan")).unwrap();

    let mut versioned = bytes.clone();
    versioned[0] = FORMAT_VERSION + 1;
    assert!(matches!(
        engine.deserialize::<String>(&versioned),
        Err(Error::UnsupportedVersion(v)) if v == FORMAT_VERSION + 1
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        engine.deserialize::<String>(&trailing),
        Err(Error::TrailingBytes(1))
    ));

    let error =
        engine.deserialize::<String>(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Structural);
}

#[test]
#[traced_test]
fn invalid_variant_index_is_rejected() {
    let engine = test_support::engine();
    let mut bytes = engine.serialize(&Literal::Null).unwrap();

    // version, root key, fallback tag, then the variant index
    let index = 1 + 16 + 1;
    bytes[index] = 9;

    assert!(matches!(
        engine.deserialize::<Literal>(&bytes),
        Err(Error::InvalidVariant { index: 9, count: 3, .. })
    ));
}

#[test]
#[traced_test]
fn nesting_beyond_the_limit_fails() {
    let engine = test_support::builder().max_depth(4).build().unwrap();

    assert!(engine.serialize(&vec![vec![1u8]]).is_ok());

    let error = engine.serialize(&vec![vec![vec![vec![1u8]]]]).unwrap_err();
    assert!(matches!(error, Error::DepthExceeded { limit: 4 }));
}

#[test]
#[traced_test]
fn unknown_fallback_tag_is_rejected() {
    let engine = test_support::engine();
    let mut bytes = engine.serialize(&Literal::Null).unwrap();

    // version, root key, then the fallback tag
    let tag = 1 + 16;
    assert_eq!(bytes[tag], 1);
    bytes[tag] = 7;

    let error = engine.deserialize::<Literal>(&bytes).unwrap_err();
    assert!(matches!(error, Error::UnknownTag { what: "fallback", tag: 7 }));
    assert_eq!(error.kind(), ErrorKind::Structural);
}

#[test]
#[traced_test]
fn unknown_trait_definition_tag_is_rejected() {
    let engine = test_support::engine();
    let mut bytes = engine.serialize(&TraitDef::Distribution).unwrap();

    assert_eq!(bytes.len(), 1 + 16 + 1);
    bytes[17] = 3;

    let error = engine.deserialize::<TraitDef>(&bytes).unwrap_err();
    assert!(matches!(
        error,
        Error::UnknownTag { what: "trait definition", tag: 3 }
    ));
    assert_eq!(error.kind(), ErrorKind::Structural);
}
