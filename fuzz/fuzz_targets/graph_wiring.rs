#![no_main]

use ferrous_inject::{Binding, Graph, GraphConfig, InjectError, Provider, Slot, TypeRegistry, Variadic};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

// Each byte pair wires one slot: the first picks a dependency, the second a
// binding style. Any graph the bytes describe must resolve or fail cleanly.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let count = (data.len() / 2).min(32);
    let slots: Vec<Slot<u64>> = (0..count).map(|i| Slot::named(format!("s{i}"))).collect();
    let config = GraphConfig::default().with_max_depth(64);
    let mut graph = Graph::with_config(TypeRegistry::new(), config);

    for (i, pair) in data.chunks_exact(2).take(count).enumerate() {
        let target = pair[0] as usize % count;
        let provider = match pair[1] % 4 {
            0 => Provider::new(move || i as u64, vec![]),
            1 => Provider::new(|n: Arc<u64>| n.wrapping_add(1), vec![Binding::slot(&slots[target])]),
            2 => Provider::new(
                |all: Variadic<u64>| all.iter().map(|n| **n).fold(0u64, u64::wrapping_add),
                vec![Binding::slot(&slots[target]), Binding::slot(&slots[i])],
            ),
            _ => Provider::auto(|n: Arc<u64>| *n),
        };
        if let Ok(provider) = provider {
            let _ = graph.define(&slots[i], provider);
        }
    }

    let report = graph.validate();
    match graph.resolve_all() {
        Ok(()) => {
            for slot in &slots {
                if graph.contains(slot) {
                    assert!(slot.is_set());
                }
            }
        }
        Err(InjectError::Cyclic(path)) => {
            assert!(path.len() >= 2);
            assert_eq!(path.first(), path.last());
            assert!(!report.is_valid());
        }
        Err(_) => {}
    }

    graph.finalize();
    for slot in &slots {
        if graph.contains(slot) {
            assert!(!slot.is_set());
        }
    }
});
