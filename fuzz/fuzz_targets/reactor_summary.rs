#![no_main]

use critic_core::config::ReactorConfig;
use critic_core::duration::parse_build_duration;
use critic_core::reactor::{
    parse_artifact_mapping, parse_reactor_summary_entry, resolve_durations,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    for line in input.lines() {
        if let Some((_, raw)) = parse_reactor_summary_entry(line) {
            let _ = parse_build_duration(&raw);
        }
    }

    // First half is the mapping, second half the log.
    let mid = input
        .char_indices()
        .map(|(i, _)| i)
        .nth(input.chars().count() / 2)
        .unwrap_or(input.len());
    let (mapping, log) = input.split_at(mid);
    if let Ok(mapping) = parse_artifact_mapping(mapping) {
        let _ = resolve_durations(&mapping, log.lines(), &ReactorConfig::default());
    }
});
