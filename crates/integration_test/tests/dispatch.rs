//! Category dispatch and resolution failures.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]

use std::sync::Arc;

use planwire::{
    Category, DataTypeRef, Error, ErrorKind, ExactKind, OperatorRef,
    PluginRef, Strategy, TableRef, TypeDescription, TypeInfo, TypeKind,
};
use planwire_integration_test::{
    FactoryError, PlanNode, Statistics, TestCatalog, TestEnvironment,
};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn registry_is_fixed_per_type() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();
    let registry = engine.registry();

    let expected: [(TypeInfo, Strategy); 8] = [
        (TypeInfo::of::<OperatorRef>(), Category::Operator.into()),
        (TypeInfo::of::<DataTypeRef>(), Category::DataType.into()),
        (TypeInfo::of::<PluginRef>(), Category::Plugin.into()),
        (TypeInfo::of::<Statistics>(), Category::Writable.into()),
        (TypeInfo::of::<TableRef>(), ExactKind::Table.into()),
        (TypeInfo::of::<Vec<u8>>(), ExactKind::Collection.into()),
        (TypeInfo::of::<String>(), ExactKind::Platform.into()),
        (TypeInfo::of::<PlanNode>(), Strategy::Injecting),
    ];

    for _ in 0..3 {
        for (info, strategy) in &expected {
            assert_eq!(registry.resolve(info), *strategy, "{}", info.name);
        }
    }
}

#[test]
#[traced_test]
fn operators_travel_by_name() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    let operator = env.catalog.operator("AND");
    let bytes = engine.serialize(&operator).unwrap();

    assert!(bytes.windows(3).any(|window| window == b"AND"));

    let decoded = engine.deserialize::<OperatorRef>(&bytes).unwrap();
    assert!(Arc::ptr_eq(&decoded.0, &operator.0));
}

#[test]
#[traced_test]
fn unknown_operator_is_a_resolution_error() {
    let planner = TestEnvironment::new("planner");
    let executor = TestEnvironment::new("executor");

    let mut catalog = TestCatalog::standard();
    catalog.add_operator("REGEXP_LIKE");
    let planner = TestEnvironment { catalog: Arc::new(catalog), ..planner };

    let bytes = planner
        .engine()
        .serialize(&planner.catalog.operator("REGEXP_LIKE"))
        .unwrap();
    let error =
        executor.engine().deserialize::<OperatorRef>(&bytes).unwrap_err();

    assert!(matches!(
        &error,
        Error::UnknownOperator(name) if name == "REGEXP_LIKE"
    ));
    assert_eq!(error.kind(), ErrorKind::Resolution);
}

#[test]
#[traced_test]
fn unknown_plugin_is_a_resolution_error() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    let plugin = env.plugins.register("s3");
    let bytes = engine.serialize(&plugin).unwrap();
    assert!(engine.deserialize::<PluginRef>(&bytes).is_ok());

    env.plugins.unregister("s3");
    let error = engine.deserialize::<PluginRef>(&bytes).unwrap_err();

    assert!(matches!(&error, Error::UnknownPlugin(name) if name == "s3"));
}

#[test]
#[traced_test]
fn unknown_table_is_a_resolution_error() {
    let env = TestEnvironment::new("local");
    let mut catalog = TestCatalog::standard();
    catalog.add_table(&["staging", "orders"], 10);
    let staging =
        TestEnvironment { catalog: Arc::new(catalog), ..env.clone() };

    let table = staging.catalog.table(&["staging", "orders"]);
    let bytes = staging.engine().serialize(&table).unwrap();

    assert!(staging.engine().deserialize::<TableRef>(&bytes).is_ok());

    let error = env.engine().deserialize::<TableRef>(&bytes).unwrap_err();
    assert!(matches!(
        error,
        Error::UnknownTable(path) if path == ["staging", "orders"]
    ));
}

#[test]
#[traced_test]
fn data_types_are_rebuilt_by_the_factory() {
    let planner = TestEnvironment::new("planner");
    let executor = TestEnvironment::new("executor");

    let nested = TypeDescription::array(TypeDescription::structure([
        ("k".to_owned(), TypeDescription::scalar(TypeKind::VarChar)),
        (
            "v".to_owned(),
            TypeDescription::decimal(38, 10).with_nullable(false),
        ),
    ]));
    let data_type = planner.data_type(&nested);

    let bytes = planner.engine().serialize(&data_type).unwrap();
    let decoded =
        executor.engine().deserialize::<DataTypeRef>(&bytes).unwrap();

    assert_eq!(decoded.describe(), nested);
    assert_eq!(executor.cluster.factory().created(), 1);
}

#[test]
#[traced_test]
fn factory_rejection_is_reported_with_its_cause() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    // a planner with a laxer factory produced a type this one refuses
    let lax = DataTypeRef::new(Arc::new(LaxDecimal));
    let bytes = engine.serialize(&lax).unwrap();

    let error = engine.deserialize::<DataTypeRef>(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Resolution);

    let Error::TypeFactory { kind, source } = error else {
        panic!("expected a type factory error");
    };
    assert_eq!(kind, TypeKind::Decimal);
    assert!(matches!(
        source.downcast_ref::<FactoryError>(),
        Some(FactoryError::PrecisionTooLarge(76))
    ));
}

#[derive(Debug)]
struct LaxDecimal;

impl planwire::DataType for LaxDecimal {
    fn describe(&self) -> TypeDescription { TypeDescription::decimal(76, 0) }
}

#[test]
#[traced_test]
fn writables_carry_their_native_bytes() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    let statistics = Statistics { row_count: 12.5, distinct_keys: 3 };
    let bytes = engine.serialize(&statistics).unwrap();

    // version, root key, length prefix, then the native big-endian form
    assert_eq!(bytes.len(), 1 + 16 + 1 + 16);
    assert_eq!(&bytes[18..26], &12.5f64.to_be_bytes());

    assert_eq!(engine.deserialize::<Statistics>(&bytes).unwrap(), statistics);
}

#[test]
#[traced_test]
fn malformed_native_bytes_are_structural_errors() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    let mut bytes = engine
        .serialize(&Statistics { row_count: 1.0, distinct_keys: 1 })
        .unwrap();

    // shrink the native form by one byte
    bytes[17] = 15;
    bytes.pop();

    let error = engine.deserialize::<Statistics>(&bytes).unwrap_err();
    assert!(matches!(error, Error::Native { .. }));
    assert_eq!(error.kind(), ErrorKind::Structural);
}
