use ferrous_inject::{bind, Binding, Graph, GraphConfig, InjectError, Provider, Slot, TypeRegistry};
use std::sync::Arc;

struct Node;

fn node(_: Arc<Node>) -> Node {
    Node
}

#[test]
fn test_self_circular_dependency() {
    let a: Slot<Node> = Slot::named("a");
    let mut graph = Graph::default();
    graph.define(&a, Provider::new(node, bind![&a]).unwrap()).unwrap();

    match graph.resolve(&a) {
        Err(InjectError::Cyclic(path)) => assert_eq!(path, vec!["a", "a"]),
        other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_two_node_cycle_reports_the_path() {
    let a: Slot<Node> = Slot::named("a");
    let b: Slot<Node> = Slot::named("b");
    let mut graph = Graph::default();
    graph.define(&a, Provider::new(node, bind![&b]).unwrap()).unwrap();
    graph.define(&b, Provider::new(node, bind![&a]).unwrap()).unwrap();

    let err = graph.resolve(&a).map(|_| ()).unwrap_err();
    assert_eq!(err, InjectError::Cyclic(vec!["a".into(), "b".into(), "a".into()]));
    assert_eq!(err.to_string(), "cyclic dependency: a -> b -> a");
}

#[test]
fn test_cycle_through_a_longer_chain() {
    let a: Slot<Node> = Slot::named("a");
    let b: Slot<Node> = Slot::named("b");
    let c: Slot<Node> = Slot::named("c");
    let d: Slot<Node> = Slot::named("d");
    let mut graph = Graph::default();
    graph.define(&a, Provider::new(node, bind![&b]).unwrap()).unwrap();
    graph.define(&b, Provider::new(node, bind![&c]).unwrap()).unwrap();
    graph.define(&c, Provider::new(node, bind![&d]).unwrap()).unwrap();
    graph.define(&d, Provider::new(node, bind![&b]).unwrap()).unwrap();

    // the path starts at the repeated definition, not at the entry point
    assert_eq!(
        graph.resolve(&a).map(|_| ()),
        Err(InjectError::Cyclic(vec!["b".into(), "c".into(), "d".into(), "b".into()]))
    );
}

#[test]
fn test_failed_cycle_leaves_everything_unresolved() {
    let a: Slot<Node> = Slot::named("a");
    let b: Slot<Node> = Slot::named("b");
    let mut graph = Graph::default();
    graph.define(&a, Provider::new(node, bind![&b]).unwrap()).unwrap();
    graph.define(&b, Provider::new(node, bind![&a]).unwrap()).unwrap();

    assert!(graph.resolve_all().is_err());
    assert!(!a.is_set());
    assert!(!b.is_set());
    assert!(graph.definitions().all(|d| !d.is_resolved()));
}

#[test]
fn test_auto_bindings_participate_in_cycles() {
    struct Left;
    struct Right;

    let left: Slot<Left> = Slot::named("left");
    let right: Slot<Right> = Slot::named("right");
    let mut graph = Graph::default();
    graph.define(&left, Provider::auto(|_: Arc<Right>| Left).unwrap()).unwrap();
    graph.define(&right, Provider::new(|_: Arc<Left>| Right, vec![Binding::Auto]).unwrap()).unwrap();

    assert!(matches!(
        graph.resolve(&right).map(|_| ()),
        Err(InjectError::Cyclic(path)) if path == vec!["right", "left", "right"]
    ));
}

#[test]
fn test_deep_chains_hit_the_depth_limit() {
    let slots: Vec<Slot<Node>> = (0..8).map(|i| Slot::named(format!("n{i}"))).collect();
    let config = GraphConfig::default().with_max_depth(4);
    let mut graph = Graph::with_config(TypeRegistry::new(), config);
    for pair in slots.windows(2) {
        graph.define(&pair[0], Provider::new(node, bind![&pair[1]]).unwrap()).unwrap();
    }
    graph.define(&slots[7], Provider::new(|| Node, vec![]).unwrap()).unwrap();

    assert_eq!(graph.resolve(&slots[0]).map(|_| ()), Err(InjectError::DepthExceeded(4)));

    // resolving from deeper in the chain fits and caches the tail
    assert!(graph.resolve(&slots[4]).is_ok());
    assert!(graph.resolve(&slots[0]).is_ok());
}

#[test]
fn test_disabled_detection_falls_back_to_the_depth_limit() {
    let a: Slot<Node> = Slot::named("a");
    let b: Slot<Node> = Slot::named("b");
    let config = GraphConfig::default().with_cycle_detection(false).with_max_depth(16);
    let mut graph = Graph::with_config(TypeRegistry::new(), config);
    graph.define(&a, Provider::new(node, bind![&b]).unwrap()).unwrap();
    graph.define(&b, Provider::new(node, bind![&a]).unwrap()).unwrap();

    assert_eq!(graph.resolve(&a).map(|_| ()), Err(InjectError::DepthExceeded(16)));
}

fn chain(len: usize) -> (Graph, Vec<Slot<u64>>) {
    let slots: Vec<Slot<u64>> = (0..len).map(|_| Slot::new()).collect();
    let mut graph = Graph::default();
    graph.define(&slots[0], Provider::new(|| 0u64, vec![]).unwrap()).unwrap();
    for pair in slots.windows(2) {
        graph
            .define(&pair[1], Provider::new(|n: Arc<u64>| *n + 1, bind![&pair[0]]).unwrap())
            .unwrap();
    }
    (graph, slots)
}

#[test]
fn test_default_depth_fits_a_chain_just_under_the_limit() {
    let len = GraphConfig::default().max_depth - 1;
    let (graph, slots) = chain(len);

    assert_eq!(*graph.resolve(&slots[len - 1]).unwrap(), len as u64 - 1);
    assert!(slots.iter().all(|slot| slot.is_set()));
}

#[test]
fn test_default_depth_rejects_a_longer_chain() {
    let max_depth = GraphConfig::default().max_depth;
    let (graph, slots) = chain(max_depth + 1);

    assert_eq!(
        graph.resolve(&slots[max_depth]).map(|_| ()),
        Err(InjectError::DepthExceeded(max_depth))
    );
    assert!(slots.iter().all(|slot| !slot.is_set()));
}

#[test]
fn test_default_depth_catches_cycles_when_detection_is_off() {
    let a: Slot<Node> = Slot::named("a");
    let b: Slot<Node> = Slot::named("b");
    let config = GraphConfig::default().with_cycle_detection(false);
    let max_depth = config.max_depth;
    let mut graph = Graph::with_config(TypeRegistry::new(), config);
    graph.define(&a, Provider::new(node, bind![&b]).unwrap()).unwrap();
    graph.define(&b, Provider::new(node, bind![&a]).unwrap()).unwrap();

    assert_eq!(graph.resolve(&a).map(|_| ()), Err(InjectError::DepthExceeded(max_depth)));
}
