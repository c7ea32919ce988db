use fetcher_core::MemoryUsage;

/// Samples the process memory from `/proc/self/status`.
///
/// `rss_mb` is the resident set (`VmRSS`), `heap_mb` the data segment
/// (`VmData`). Returns `None` where procfs is unavailable.
pub fn sample() -> Option<MemoryUsage> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_status(&status)
}

fn parse_status(status: &str) -> Option<MemoryUsage> {
    let rss_kb = field_kb(status, "VmRSS:")?;
    let heap_kb = field_kb(status, "VmData:").unwrap_or(0);
    Some(MemoryUsage {
        rss_mb: kb_to_mb(rss_kb),
        heap_mb: kb_to_mb(heap_kb),
    })
}

fn field_kb(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

fn kb_to_mb(kb: u64) -> u32 {
    u32::try_from(kb / 1024).unwrap_or(u32::MAX)
}
