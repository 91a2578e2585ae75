use std::sync::Arc;

use tracing_test::traced_test;

use crate::{
    Configuration, Error, ErrorKind, Identifiable, MAX_BUFFER_SIZE,
    PlanEnvironment, test_support,
};

#[test]
#[traced_test]
fn environment_references_are_always_injected() {
    let engine = test_support::engine();
    let injections = engine.injections();

    assert_eq!(injections.len(), 3);
    assert!(injections.contains(<Arc<dyn PlanEnvironment>>::TYPE_KEY));
    assert!(injections.contains(<Arc<dyn crate::CatalogResolver>>::TYPE_KEY));
    assert!(injections.contains(<Arc<dyn crate::PluginRegistry>>::TYPE_KEY));
}

#[test]
#[traced_test]
fn extra_injections_are_added() {
    let engine = test_support::builder()
        .with_injection(String::from("default schema"))
        .build()
        .unwrap();

    assert_eq!(engine.injections().len(), 4);
    assert!(engine.injections().contains(String::TYPE_KEY));
}

#[test]
#[traced_test]
fn reinjecting_the_environment_is_rejected() {
    let cluster: Arc<dyn PlanEnvironment> =
        Arc::new(test_support::Cluster::default());

    let error = test_support::builder()
        .with_injection(cluster)
        .build()
        .unwrap_err();

    assert!(matches!(error, Error::DuplicateInjection { .. }));
    assert_eq!(error.kind(), ErrorKind::Configuration);
}

#[test]
#[traced_test]
fn duplicate_user_injections_are_rejected() {
    let error = test_support::builder()
        .with_injection(1u32)
        .with_injection(2u32)
        .build()
        .unwrap_err();

    assert!(matches!(
        error,
        Error::DuplicateInjection { type_name: "u32", key }
            if key == u32::TYPE_KEY
    ));
}

#[test]
#[traced_test]
fn buffer_size_is_clamped() {
    let engine =
        test_support::builder().buffer_size(usize::MAX).build().unwrap();
    assert_eq!(engine.context().buffer_size(), MAX_BUFFER_SIZE);
    assert!(logs_contain("clamping buffer size"));

    let engine = test_support::builder().buffer_size(64).build().unwrap();
    assert_eq!(engine.context().buffer_size(), 64);

    let engine = test_support::builder()
        .buffer_size(MAX_BUFFER_SIZE)
        .build()
        .unwrap();
    assert_eq!(engine.context().buffer_size(), MAX_BUFFER_SIZE);
}

#[test]
#[traced_test]
fn zero_sizes_are_rejected() {
    assert!(matches!(
        test_support::builder().buffer_size(0).build(),
        Err(Error::InvalidBufferSize)
    ));
    assert!(matches!(
        test_support::builder().max_depth(0).build(),
        Err(Error::InvalidMaxDepth)
    ));
}

#[test]
#[traced_test]
fn configuration_defaults() {
    let configuration = Configuration::default();

    assert_eq!(configuration.buffer_size, MAX_BUFFER_SIZE);
    assert_eq!(configuration.max_depth, crate::DEFAULT_MAX_DEPTH);

    let engine = test_support::builder()
        .configuration(Configuration::builder().max_depth(8).build())
        .build()
        .unwrap();
    assert_eq!(engine.max_depth(), 8);
    assert_eq!(engine.context().buffer_size(), MAX_BUFFER_SIZE);
}
