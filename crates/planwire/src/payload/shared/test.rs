use std::sync::{Arc, Weak};

use tracing_test::traced_test;

use crate::{Error, ErrorKind, Identifiable, Payload, test_support};

#[derive(Debug, PartialEq, Eq, Identifiable, Payload)]
struct Leaf {
    value: u32,
}

#[derive(Debug, Identifiable, Payload)]
struct Pair {
    left: Arc<Leaf>,
    right: Arc<Leaf>,
}

#[derive(Debug, Default, Identifiable, Payload)]
#[payload(placeholder)]
struct Parent {
    name: String,
    children: Vec<Arc<Child>>,
}

#[derive(Debug, Identifiable, Payload)]
struct Child {
    parent: Weak<Parent>,
    ordinal: u32,
}

/// Like [`Parent`], but cannot be allocated before its fields are read.
#[derive(Debug, Identifiable, Payload)]
struct Eager {
    children: Vec<Arc<EagerChild>>,
}

#[derive(Debug, Identifiable, Payload)]
struct EagerChild {
    parent: Weak<Eager>,
}

fn family(name: &str, count: u32) -> Arc<Parent> {
    Arc::new_cyclic(|weak| Parent {
        name: name.to_owned(),
        children: (0..count)
            .map(|ordinal| {
                Arc::new(Child { parent: weak.clone(), ordinal })
            })
            .collect(),
    })
}

#[test]
#[traced_test]
fn shared_leaf_is_decoded_once() {
    let engine = test_support::engine();
    let leaf = Arc::new(Leaf { value: 42 });
    let pair = Pair { left: Arc::clone(&leaf), right: leaf };

    let bytes = engine.serialize(&pair).unwrap();
    let decoded = engine.deserialize::<Pair>(&bytes).unwrap();

    assert_eq!(decoded.left.value, 42);
    assert!(Arc::ptr_eq(&decoded.left, &decoded.right));
}

#[test]
#[traced_test]
fn distinct_allocations_stay_distinct() {
    let engine = test_support::engine();
    let pair = Pair {
        left: Arc::new(Leaf { value: 1 }),
        right: Arc::new(Leaf { value: 1 }),
    };

    let decoded =
        engine.deserialize::<Pair>(&engine.serialize(&pair).unwrap()).unwrap();

    assert_eq!(decoded.left, decoded.right);
    assert!(!Arc::ptr_eq(&decoded.left, &decoded.right));
}

#[test]
#[traced_test]
fn weak_back_edges_point_at_the_decoded_parent() {
    let engine = test_support::engine();
    let parent = family("scan", 3);

    let bytes = engine.serialize(&parent).unwrap();
    let decoded = engine.deserialize::<Arc<Parent>>(&bytes).unwrap();

    assert_eq!(decoded.name, "scan");
    assert_eq!(decoded.children.len(), 3);

    for (ordinal, child) in (0..).zip(&decoded.children) {
        assert_eq!(child.ordinal, ordinal);

        let back = child.parent.upgrade().unwrap();
        assert!(Arc::ptr_eq(&back, &decoded));
    }
}

#[test]
#[traced_test]
fn weak_back_edge_without_placeholder_is_a_cycle() {
    let engine = test_support::engine();
    let eager = Arc::new_cyclic(|weak| Eager {
        children: vec![Arc::new(EagerChild { parent: weak.clone() })],
    });

    let bytes = engine.serialize(&eager).unwrap();
    let error = engine.deserialize::<Arc<Eager>>(&bytes).unwrap_err();

    assert!(matches!(error, Error::CyclicReference { .. }));
}

#[test]
#[traced_test]
fn dropped_weak_decodes_as_dangling() {
    let engine = test_support::engine();
    let child = Child { parent: Weak::new(), ordinal: 7 };

    let bytes = engine.serialize(&child).unwrap();
    let decoded = engine.deserialize::<Child>(&bytes).unwrap();

    assert_eq!(decoded.ordinal, 7);
    assert!(decoded.parent.upgrade().is_none());
}

#[test]
#[traced_test]
fn back_reference_to_unknown_position_is_rejected() {
    let engine = test_support::engine();
    let mut bytes = engine.serialize(&Arc::new(3u32)).unwrap();

    // version, root key, fallback tag, then the shared tag
    let shared_tag = 1 + 16 + 1;
    assert_eq!(bytes[shared_tag], 0);
    bytes[shared_tag] = 1;

    let error = engine.deserialize::<Arc<u32>>(&bytes).unwrap_err();
    assert!(matches!(error, Error::DanglingReference { position: 3 }));
}

#[test]
#[traced_test]
fn unknown_shared_tag_is_rejected() {
    let engine = test_support::engine();
    let mut bytes = engine.serialize(&Arc::new(Leaf { value: 5 })).unwrap();

    let shared_tag = 1 + 16 + 1;
    bytes[shared_tag] = 5;

    let error = engine.deserialize::<Arc<Leaf>>(&bytes).unwrap_err();
    assert!(matches!(
        error,
        Error::UnknownTag { what: "shared reference", tag: 5 }
    ));
    assert_eq!(error.kind(), ErrorKind::Structural);
}
