use std::collections::BTreeMap;

use super::Registry;
use crate::{
    Identifiable, Payload,
    environment::{DataTypeRef, OperatorRef, PluginRef},
    payload::{CategoryForm, CategoryValue},
    strategy::{ExactKind, Strategy},
    type_info::{Category, TypeInfo},
};

#[derive(Debug, Clone, Identifiable, Payload)]
struct Plain {
    rows: u64,
}

/// Claims every category, listed in reverse priority order.
#[derive(Debug, Clone, Identifiable)]
struct Everything;

impl Payload for Everything {
    const CATEGORIES: &'static [Category] = &[
        Category::Writable,
        Category::Plugin,
        Category::DataType,
        Category::Operator,
    ];

    fn category_form(
        &self,
        _category: Category,
    ) -> crate::Result<CategoryForm<'_>> {
        Ok(CategoryForm::Operator("everything"))
    }

    fn from_category_value(_value: CategoryValue) -> crate::Result<Self> {
        Ok(Self)
    }
}

#[test]
fn unregistered_types_fall_back_to_injecting() {
    let registry = Registry::new();

    let strategy = registry.resolve(&TypeInfo::of::<Plain>());

    assert!(strategy.is_injecting());
    assert!(strategy.as_exact().is_none());
    assert!(registry.is_empty());
}

#[test]
fn exact_registration_covers_the_whole_family() {
    let mut registry = Registry::new();
    assert!(registry.register_exact::<Vec<()>>(ExactKind::Collection));

    for info in [
        TypeInfo::of::<Vec<u32>>(),
        TypeInfo::of::<Vec<String>>(),
        TypeInfo::of::<Vec<Vec<Plain>>>(),
    ] {
        assert_eq!(
            registry.resolve(&info),
            Strategy::Exact(ExactKind::Collection)
        );
    }

    assert_eq!(
        registry.exact_kind(<Vec<u8>>::FAMILY),
        Some(ExactKind::Collection)
    );
    assert_eq!(registry.exact_kind(<BTreeMap<u8, u8>>::FAMILY), None);
}

#[test]
fn second_registration_of_a_family_is_ignored() {
    let mut registry = Registry::new();

    assert!(registry.register_exact::<u32>(ExactKind::Platform));
    assert!(!registry.register_exact::<u32>(ExactKind::Table));

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.resolve(&TypeInfo::of::<u32>()),
        Strategy::Exact(ExactKind::Platform)
    );
}

#[test]
fn categories_resolve_by_declaration() {
    let registry = Registry::new();

    assert_eq!(
        registry.resolve(&TypeInfo::of::<OperatorRef>()),
        Strategy::Category(Category::Operator)
    );
    assert_eq!(
        registry.resolve(&TypeInfo::of::<DataTypeRef>()),
        Strategy::Category(Category::DataType)
    );
    assert_eq!(
        registry.resolve(&TypeInfo::of::<PluginRef>()),
        Strategy::Category(Category::Plugin)
    );
}

#[test]
fn first_category_in_priority_order_wins() {
    let registry = Registry::new();

    let strategy = registry.resolve(&TypeInfo::of::<Everything>());
    assert_eq!(strategy.as_category(), Some(&Category::Operator));
}

#[test]
fn exact_registration_beats_categories() {
    let mut registry = Registry::new();
    registry.register_exact::<Everything>(ExactKind::Platform);

    let strategy = registry.resolve(&TypeInfo::of::<Everything>());
    assert_eq!(strategy.into_exact(), Ok(ExactKind::Platform));
}

#[test]
fn resolution_is_deterministic() {
    let mut registry = Registry::new();
    registry.register_exact::<String>(ExactKind::Platform);

    let infos = [
        TypeInfo::of::<String>(),
        TypeInfo::of::<Plain>(),
        TypeInfo::of::<Everything>(),
        TypeInfo::of::<OperatorRef>(),
    ];
    let first = infos.map(|info| registry.resolve(&info));

    for _ in 0..16 {
        assert_eq!(infos.map(|info| registry.resolve(&info)), first);
    }
}
