use ferrous_inject::{bind, Binding, Graph, Provider, Slot};
use std::sync::Arc;

#[test]
fn test_empty_graph() {
    assert_eq!(Graph::default().to_string(), "&graph{\n  definitions: []\n}");
}

#[test]
fn test_definition_before_and_after_resolution() {
    let port: Slot<u16> = Slot::named("port");
    let mut graph = Graph::default();
    graph.define(&port, Provider::new(|| 80u16, vec![]).unwrap()).unwrap();

    let definition = graph.definition(&port.erased()).unwrap();
    assert_eq!(
        definition.to_string(),
        "&definition{\n  slot: u16=port,\n  provider: &provider{\n    constructor: fn() -> u16,\n    bindings: []\n  },\n  value: <nil>\n}"
    );

    graph.resolve_all().unwrap();
    let definition = graph.definition(&port.erased()).unwrap();
    assert!(definition.to_string().ends_with("  value: <u16 value>\n}"));
}

#[test]
fn test_provider_lists_auto_bindings() {
    let provider = Provider::new(|n: Arc<u8>| *n, vec![Binding::Auto]).unwrap();
    assert_eq!(
        provider.to_string(),
        "&provider{\n  constructor: fn(u8) -> u8,\n  bindings: [\n    auto\n  ]\n}"
    );
}

#[test]
fn test_graph_display_is_sorted() {
    let a: Slot<u8> = Slot::named("a");
    let b: Slot<u8> = Slot::named("b");
    let c: Slot<u8> = Slot::named("c");

    let mut forward = Graph::default();
    forward.define(&a, Provider::new(|| 1u8, vec![]).unwrap()).unwrap();
    forward.define(&b, Provider::new(|n: Arc<u8>| *n, bind![&a]).unwrap()).unwrap();
    forward.define(&c, Provider::new(|n: Arc<u8>| *n, bind![&b]).unwrap()).unwrap();

    let mut backward = Graph::default();
    backward.define(&c, Provider::new(|n: Arc<u8>| *n, bind![&b]).unwrap()).unwrap();
    backward.define(&b, Provider::new(|n: Arc<u8>| *n, bind![&a]).unwrap()).unwrap();
    backward.define(&a, Provider::new(|| 1u8, vec![]).unwrap()).unwrap();

    let rendered = forward.to_string();
    assert_eq!(rendered, backward.to_string());
    assert!(rendered.starts_with("&graph{\n  definitions: [\n    &definition{\n      slot: u8=a,"));

    let first = rendered.find("slot: u8=a").unwrap();
    let second = rendered.find("slot: u8=b").unwrap();
    let third = rendered.find("slot: u8=c").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_debug_output_is_compact() {
    let graph = Graph::default();
    let debug = format!("{graph:?}");
    assert!(debug.starts_with("Graph { definitions: 0, observers: 0"));
}
