//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// A requirements manifest with `count` entries in a realistic mix of shapes
pub fn create_manifest_lines(count: usize) -> Vec<String> {
    let mut lines = vec!["# generated manifest".to_string(), String::new()];
    for i in 0..count {
        let line = match i % 6 {
            0 => format!("package-{}=={}.{}.{}", i, i % 5 + 1, i % 10, i % 7),
            1 => format!("package-{}>={}.{},<{}", i, i % 3 + 1, i % 10, i % 3 + 2),
            2 => format!("package-{}[extra-a,extra-b]~={}.{}", i, i % 4 + 1, i % 9),
            3 => format!("package-{} ; python_version < \"3.{}\"", i, i % 4 + 6),
            4 => format!("package-{}  # pinned upstream", i),
            _ => format!("package-{}>=1.0 ; sys_platform == \"linux\" and python_version >= \"3.6\"", i),
        };
        lines.push(line);
    }
    lines
}
