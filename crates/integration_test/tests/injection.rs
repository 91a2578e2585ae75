//! Injection of environment-bound values.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]

use std::sync::Arc;

use planwire::{
    Error, ErrorKind, Identifiable, Payload, PlanEnvironment, Strategy,
    TypeInfo,
};
use planwire_integration_test::TestEnvironment;
use tracing_test::traced_test;

// ============================================================================
// Fixtures
// ============================================================================

/// Options of the running query; injected by executors, planned with
/// whatever the planner had.
#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Payload)]
pub struct QueryOptions {
    pub user: String,
    pub parallelism: u32,
}

#[derive(Debug, Identifiable, Payload)]
pub struct Fragment {
    pub cluster: Arc<dyn PlanEnvironment>,
    pub options: QueryOptions,
    pub major: u32,
}

fn options(user: &str) -> QueryOptions {
    QueryOptions { user: user.to_owned(), parallelism: 4 }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[traced_test]
fn injected_value_is_replaced_by_the_decoding_instance() {
    let planner = TestEnvironment::new("planner");
    let executor = TestEnvironment::new("executor");

    let planning = planner
        .builder()
        .with_injection(options("planner"))
        .build()
        .unwrap();
    let executing = executor
        .builder()
        .with_injection(options("executor"))
        .build()
        .unwrap();

    let fragment = Fragment {
        cluster: planner.cluster(),
        options: options("x"),
        major: 3,
    };

    let bytes = planning.serialize(&fragment).unwrap();
    let decoded = executing.deserialize::<Fragment>(&bytes).unwrap();

    assert_eq!(decoded.options, options("executor"));
    assert_eq!(decoded.major, 3);
    assert!(Arc::ptr_eq(&decoded.cluster, &executor.cluster()));
}

#[test]
#[traced_test]
fn injected_values_carry_no_payload() {
    let env = TestEnvironment::new("local");

    let injecting =
        env.builder().with_injection(options("a")).build().unwrap();
    let plain = env.engine();

    let long = QueryOptions { user: "x".repeat(1000), parallelism: 1 };

    let injected = injecting.serialize(&long).unwrap();
    let structural = plain.serialize(&long).unwrap();

    assert!(injected.len() < 32);
    assert!(structural.len() > 1000);
}

#[test]
#[traced_test]
fn missing_injection_fails_on_decode() {
    let env = TestEnvironment::new("local");

    let injecting =
        env.builder().with_injection(options("a")).build().unwrap();
    let plain = env.engine();

    let fragment =
        Fragment { cluster: env.cluster(), options: options("a"), major: 1 };
    let bytes = injecting.serialize(&fragment).unwrap();

    let error = plain.deserialize::<Fragment>(&bytes).unwrap_err();

    assert!(matches!(
        error,
        Error::MissingInjection { key, .. } if key == QueryOptions::TYPE_KEY
    ));
    assert_eq!(error.kind(), ErrorKind::Resolution);
}

#[test]
#[traced_test]
fn uninjected_values_are_written_structurally() {
    let env = TestEnvironment::new("local");
    let engine = env.engine();

    assert_eq!(
        engine.registry().resolve(&TypeInfo::of::<QueryOptions>()),
        Strategy::Injecting
    );

    let value = options("structural");
    let bytes = engine.serialize(&value).unwrap();

    assert_eq!(engine.deserialize::<QueryOptions>(&bytes).unwrap(), value);
}

#[test]
#[traced_test]
fn environment_reference_decodes_to_each_engines_own_cluster() {
    let first = TestEnvironment::new("first");
    let second = TestEnvironment::new("second");

    let bytes = first.engine().serialize(&first.cluster()).unwrap();

    let decoded = second
        .engine()
        .deserialize::<Arc<dyn PlanEnvironment>>(&bytes)
        .unwrap();

    assert!(Arc::ptr_eq(&decoded, &second.cluster()));
    assert!(!Arc::ptr_eq(&decoded, &first.cluster()));
}

#[test]
#[traced_test]
fn duplicate_injection_is_a_configuration_error() {
    let env = TestEnvironment::new("local");

    let error = env
        .builder()
        .with_injection(options("a"))
        .with_injection(options("b"))
        .build()
        .unwrap_err();

    assert!(matches!(
        error,
        Error::DuplicateInjection { key, .. } if key == QueryOptions::TYPE_KEY
    ));
    assert_eq!(error.kind(), ErrorKind::Configuration);

    let other = TestEnvironment::new("other");
    let error = env
        .builder()
        .with_injection(other.cluster())
        .build()
        .unwrap_err();

    assert!(matches!(error, Error::DuplicateInjection { .. }));
}
