#![no_main]

use critic_core::graph::{DependencyTopology, compute_critical_path};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses must be acyclic and solvable.
    if let Ok(topology) = DependencyTopology::parse(input) {
        let _ = compute_critical_path(&topology.graph);
    }
});
