//! Parsers for device diagnostic output.
//!
//! These are pure functions over captured text, designed to be tested with
//! string inputs. They never run commands themselves.

use std::sync::LazyLock;

use regex::Regex;

use crate::collector::error::CollectError;
use crate::models::{CpuMetrics, MemoryField, MemoryReport, Origin};

/// Clock ticks per second (USER_HZ). Standard value for Android kernels.
pub const CLK_TCK: i64 = 100;

/// Minimum number of fields in `/proc/[pid]/stat` once the name is removed.
const MIN_STAT_FIELDS: usize = 15;

/// Field offsets in the stat line with the name removed. The pid stays at 0.
const UTIME_FIELD: usize = 11;
const STIME_FIELD: usize = 12;

static COMM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)%").unwrap());

static TOTAL_PSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TOTAL\s+PSS:\s+(\d+)").unwrap());
static NATIVE_HEAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Native Heap\s+(\d+)").unwrap());
static HEAP_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Heap\s+Size[:\s]+(\d+)").unwrap());
static HEAP_ALLOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Heap\s+Alloc[:\s]+(\d+)").unwrap());

/// Cumulative CPU ticks read from `/proc/[pid]/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcStatTimes {
    pub utime: i64,
    pub stime: i64,
}

impl ProcStatTimes {
    /// Converts tick counts to a [`CpuMetrics`] with unknown usage.
    pub fn to_cpu_metrics(self) -> Result<CpuMetrics, CollectError> {
        Ok(CpuMetrics {
            usage: 0.0,
            user_time_ms: ticks_to_ms(self.utime)?,
            system_time_ms: ticks_to_ms(self.stime)?,
        })
    }
}

/// Converts clock ticks to milliseconds: `ticks * 1000 / CLK_TCK`.
pub fn ticks_to_ms(ticks: i64) -> Result<i64, CollectError> {
    ticks
        .checked_mul(1000)
        .map(|t| t / CLK_TCK)
        .ok_or_else(|| CollectError::malformed(format!("tick count {} overflows", ticks)))
}

/// Parses `/proc/[pid]/stat` content.
///
/// The process name is the first parenthesized group and may contain spaces,
/// so it is removed before splitting. The rest of the line, pid included, is
/// split on whitespace and utime and stime are read at 11 and 12.
pub fn parse_proc_stat(content: &str) -> Result<ProcStatTimes, CollectError> {
    let stripped = COMM_RE.replace(content.trim(), "");

    let fields: Vec<&str> = stripped.split_whitespace().collect();
    if fields.len() < MIN_STAT_FIELDS {
        return Err(CollectError::malformed(format!(
            "not enough fields in stat: expected {}+, got {}",
            MIN_STAT_FIELDS,
            fields.len()
        )));
    }

    let parse_ticks = |idx: usize, name: &str| -> Result<i64, CollectError> {
        fields[idx]
            .parse::<u64>()
            .ok()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| CollectError::malformed(format!("invalid {}: {:?}", name, fields[idx])))
    };

    Ok(ProcStatTimes {
        utime: parse_ticks(UTIME_FIELD, "utime")?,
        stime: parse_ticks(STIME_FIELD, "stime")?,
    })
}

/// Extracts the CPU usage percentage from `top` output.
///
/// Scans line by line and returns the first `%`-suffixed number found.
/// Returns `None` when no line holds one.
pub fn parse_top_cpu_usage(output: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        if !line.contains('%') {
            return None;
        }
        PERCENT_RE
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    })
}

/// Whether a rule may replace a value another rule already set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Always,
    IfUnset,
}

/// Up to two `(field, value)` pairs taken from one line.
pub type Extracted = [Option<(MemoryField, i64)>; 2];

/// Extracts `(field, value)` pairs from a line and the line after it.
pub type MeminfoExtractor = fn(line: &str, next: Option<&str>) -> Extracted;

/// One independent extraction applied to every line of `dumpsys meminfo`.
pub struct MeminfoRule {
    pub origin: Origin,
    pub policy: Overwrite,
    pub extract: MeminfoExtractor,
}

/// Rules applied, in order, to each line of a meminfo report.
pub static MEMINFO_RULES: [MeminfoRule; 4] = [
    MeminfoRule {
        origin: Origin::TotalPss,
        policy: Overwrite::Always,
        extract: extract_total_pss,
    },
    MeminfoRule {
        origin: Origin::NativeHeapRow,
        policy: Overwrite::Always,
        extract: extract_native_heap,
    },
    MeminfoRule {
        origin: Origin::DalvikHeapRow,
        policy: Overwrite::Always,
        extract: extract_dalvik_row,
    },
    MeminfoRule {
        origin: Origin::HeapSummary,
        policy: Overwrite::IfUnset,
        extract: extract_heap_summary,
    },
];

fn capture_kb(re: &Regex, line: &str) -> Option<i64> {
    re.captures(line).and_then(|caps| caps[1].parse().ok())
}

fn parse_kb(token: &str) -> Option<i64> {
    token.parse::<i64>().ok().filter(|v| *v >= 0)
}

fn extract_total_pss(line: &str, _next: Option<&str>) -> Extracted {
    [capture_kb(&TOTAL_PSS_RE, line).map(|v| (MemoryField::Pss, v)), None]
}

fn extract_native_heap(line: &str, _next: Option<&str>) -> Extracted {
    [
        capture_kb(&NATIVE_HEAP_RE, line).map(|v| (MemoryField::NativeHeap, v)),
        None,
    ]
}

/// Token positions of heap size and heap alloc in a `Dalvik Heap` row.
const DALVIK_SIZE_TOKEN: usize = 5;
const DALVIK_ALLOC_TOKEN: usize = 6;

/// `Dalvik Heap` table row with at least 8 tokens.
fn extract_dalvik_row(line: &str, _next: Option<&str>) -> Extracted {
    let mut values = [None; 2];
    if !line.contains("Dalvik Heap") {
        return values;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 8 {
        return values;
    }

    values[0] = parse_kb(tokens[DALVIK_SIZE_TOKEN]).map(|v| (MemoryField::HeapSize, v));
    values[1] = parse_kb(tokens[DALVIK_ALLOC_TOKEN]).map(|v| (MemoryField::HeapAlloc, v));
    values
}

/// Any line mentioning `Heap` makes the following line a candidate for
/// `Heap Size:` / `Heap Alloc:` summary values.
fn extract_heap_summary(line: &str, next: Option<&str>) -> Extracted {
    let Some(next) = next else {
        return [None; 2];
    };
    if !line.contains("Heap") {
        return [None; 2];
    }

    [
        capture_kb(&HEAP_SIZE_RE, next).map(|v| (MemoryField::HeapSize, v)),
        capture_kb(&HEAP_ALLOC_RE, next).map(|v| (MemoryField::HeapAlloc, v)),
    ]
}

fn set_memory_field(report: &mut MemoryReport, field: MemoryField, value: i64) {
    let metrics = &mut report.metrics;
    match field {
        MemoryField::Pss => metrics.pss = value,
        MemoryField::HeapSize => metrics.heap_size = value,
        MemoryField::HeapAlloc => metrics.heap_alloc = value,
        MemoryField::NativeHeap => metrics.native_heap = value,
    }
}

/// Parses `dumpsys meminfo <package>` output.
///
/// Applies [`MEMINFO_RULES`] to every line. Only `TOTAL PSS` is mandatory;
/// every other field stays zero (and absent from the provenance) when its
/// line is missing.
pub fn parse_meminfo(output: &str) -> Result<MemoryReport, CollectError> {
    let lines: Vec<&str> = output.lines().collect();
    let mut report = MemoryReport::default();

    for (i, line) in lines.iter().enumerate() {
        let next = lines.get(i + 1).copied();
        for rule in &MEMINFO_RULES {
            for (field, value) in (rule.extract)(line, next).into_iter().flatten() {
                if rule.policy == Overwrite::IfUnset && report.provenance.is_set(field) {
                    continue;
                }
                set_memory_field(&mut report, field, value);
                report.provenance.record(field, rule.origin);
            }
        }
    }

    if !report.provenance.is_set(MemoryField::Pss) {
        return Err(CollectError::MissingPss);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_LINE: &str = "12345 (com.example.app) S 567 567 0 0 -1 1077952832 \
        123456 789 0 4523 1287 0 0 10 -10 45 0 98765 1638400000 45000 \
        18446744073709551615 1 1 0 0 0 0 4612 1 1073775864 0 0 0 17 3 0 0 0 0 0";

    const MEMINFO: &str = "\
Applications Memory Usage (in Kilobytes):
Uptime: 12345678 Realtime: 12345678

** MEMINFO in pid 12345 [com.example.app] **
                   Pss  Private  Private  Swapped     Heap     Heap     Heap
                 Total    Dirty    Clean    Dirty     Size    Alloc     Free
                ------   ------   ------   ------   ------   ------   ------
  Native Heap    10264    10264        0       16    20480    15800     4680
  Dalvik Heap     2136     2136        0        0     8192     3500     4692
        TOTAL    45678    30000     5000       16    28672    19300     9372

 App Summary
                       Pss(KB)
                        ------
           Java Heap:     4500
         Native Heap:    10264

           TOTAL PSS:    45678   TOTAL RSS:    98000   TOTAL SWAP PSS:       16
";

    #[test]
    fn test_parse_proc_stat_basic() {
        let times = parse_proc_stat(STAT_LINE).unwrap();
        assert_eq!(times.utime, 4523);
        assert_eq!(times.stime, 1287);

        let cpu = times.to_cpu_metrics().unwrap();
        assert_eq!(cpu.user_time_ms, 45230);
        assert_eq!(cpu.system_time_ms, 12870);
        assert_eq!(cpu.usage, 0.0);
    }

    #[test]
    fn test_parse_proc_stat_zero_ticks() {
        let line = "1 (init) S 0 1 1 0 -1 4194560 100 0 0 0 0 0 0 0 20 0 1 0 1 0 0";
        let cpu = parse_proc_stat(line).unwrap().to_cpu_metrics().unwrap();
        assert_eq!(cpu.user_time_ms, 0);
        assert_eq!(cpu.system_time_ms, 0);
    }

    #[test]
    fn test_ticks_are_scaled_by_ten() {
        for (utime, stime) in [(0, 0), (1, 2), (99, 101), (123_456_789, 987_654_321)] {
            let line = format!(
                "42 (app) S 1 1 0 0 -1 0 0 0 0 {} {} 0 0 20 0 1 0 1",
                utime, stime
            );
            let cpu = parse_proc_stat(&line).unwrap().to_cpu_metrics().unwrap();
            assert_eq!(cpu.user_time_ms, utime * 10);
            assert_eq!(cpu.system_time_ms, stime * 10);
        }
    }

    #[test]
    fn test_parse_proc_stat_with_spaces_in_comm() {
        let line = STAT_LINE.replace("(com.example.app)", "(my busy process name)");
        let times = parse_proc_stat(&line).unwrap();
        assert_eq!(times.utime, 4523);
        assert_eq!(times.stime, 1287);
    }

    #[test]
    fn test_parse_proc_stat_exactly_fifteen_fields() {
        // pid + 14 fields once the name is removed
        let times = parse_proc_stat("42 (app) S 1 1 0 0 -1 0 0 0 0 0 4523 1287 0").unwrap();
        assert_eq!(times, ProcStatTimes { utime: 0, stime: 4523 });

        let times = parse_proc_stat("42 (app) S 1 1 0 0 -1 0 0 0 0 11 22 33 44 55").unwrap();
        assert_eq!(times, ProcStatTimes { utime: 11, stime: 22 });

        let times = parse_proc_stat("42 (app) S 1 1 0 0 -1 0 0 0 0 0 11 22 33 44 55").unwrap();
        assert_eq!(times, ProcStatTimes { utime: 0, stime: 11 });
    }

    #[test]
    fn test_parse_proc_stat_too_few_fields() {
        let line = "42 (app) S 1 1 0 0 -1 0 0 0 0 0 4523 1287";
        let err = parse_proc_stat(line).unwrap_err();
        assert!(matches!(err, CollectError::MalformedStatFormat { .. }));
        assert!(err.to_string().contains("got 14"));

        // Spaces in the name must not count towards the field total
        let line = "42 (a b c d e f g h) S 1 1 0 0 -1 0 0 0 0 0 4523 1287";
        let err = parse_proc_stat(line).unwrap_err();
        assert!(matches!(err, CollectError::MalformedStatFormat { .. }));
    }

    #[test]
    fn test_parse_proc_stat_without_name_group() {
        let line = "42 S 1 1 0 0 -1 0 0 0 0 300 400 0 0 20";
        let times = parse_proc_stat(line).unwrap();
        assert_eq!(times, ProcStatTimes { utime: 300, stime: 400 });
    }

    #[test]
    fn test_parse_proc_stat_empty_and_garbage() {
        assert!(matches!(
            parse_proc_stat(""),
            Err(CollectError::MalformedStatFormat { .. })
        ));
        assert!(matches!(
            parse_proc_stat("cat: /proc/42/stat: No such file or directory"),
            Err(CollectError::MalformedStatFormat { .. })
        ));
    }

    #[test]
    fn test_parse_proc_stat_non_numeric_ticks() {
        let line = "42 (app) S 1 1 0 0 -1 0 0 0 0 abc 1287 0 0 20 0 1 0 1";
        let err = parse_proc_stat(line).unwrap_err();
        assert!(err.to_string().contains("utime"));
    }

    #[test]
    fn test_ticks_to_ms_overflow() {
        assert!(ticks_to_ms(i64::MAX).is_err());
        assert_eq!(ticks_to_ms(250).unwrap(), 2500);
    }

    #[test]
    fn test_parse_top_legacy_row() {
        let output = "\
  PID PR CPU% S  #THR     VSS     RSS PCY UID      Name
12345  2   7% S    45 1638400K  98000K  fg u0_a123  com.example.app
";
        assert_eq!(parse_top_cpu_usage(output), Some(7.0));
    }

    #[test]
    fn test_parse_top_first_line_with_percent_wins() {
        let output = "Load 5% now\n12345 2 7% S com.example.app\n";
        assert_eq!(parse_top_cpu_usage(output), Some(5.0));

        let output = "\
User 5%, System 3%, IOW 0%, IRQ 0%
User 38 + Nice 0 + Sys 22 + Idle 680 + IOW 0 + IRQ 0 + SIRQ 2 = 742

  PID PR CPU% S  #THR     VSS     RSS PCY UID      Name
12345  2  11% S    45 1638400K  98000K  fg u0_a123  com.example.app
";
        assert_eq!(parse_top_cpu_usage(output), Some(5.0));
    }

    #[test]
    fn test_parse_top_fractional() {
        let output = "12345 u0_a123 10 -10 1.2G 98M 45M S 12.5% 1.2 0:12.34 com.example.app\n";
        assert_eq!(parse_top_cpu_usage(output), Some(12.5));
    }

    #[test]
    fn test_parse_top_percent_attached_to_word() {
        let output = "800%cpu   3%user   0%nice   5%sys 792%idle\n";
        assert_eq!(parse_top_cpu_usage(output), Some(800.0));
    }

    #[test]
    fn test_parse_top_percent_without_number() {
        let output = "\
  PID USER         PR  NI VIRT  RES  SHR S[%CPU] %MEM     TIME+ ARGS
12345 u0_a123      10 -10 1.2G  98M  45M S  2.5   1.2   0:12.34 com.example.app
";
        assert_eq!(parse_top_cpu_usage(output), None);
    }

    #[test]
    fn test_parse_top_first_match_wins() {
        let output = "a 3% b\nc 9% d\n";
        assert_eq!(parse_top_cpu_usage(output), Some(3.0));
    }

    #[test]
    fn test_parse_top_empty() {
        assert_eq!(parse_top_cpu_usage(""), None);
        assert_eq!(parse_top_cpu_usage("no percentages here\n"), None);
    }

    #[test]
    fn test_parse_meminfo_full_report() {
        let report = parse_meminfo(MEMINFO).unwrap();
        let m = report.metrics;
        assert_eq!(m.pss, 45678);
        assert_eq!(m.native_heap, 10264);
        assert_eq!(m.heap_size, 0);
        assert_eq!(m.heap_alloc, 8192);

        let p = &report.provenance;
        assert_eq!(p.origin(MemoryField::Pss), Some(Origin::TotalPss));
        assert_eq!(p.origin(MemoryField::NativeHeap), Some(Origin::NativeHeapRow));
        assert_eq!(p.origin(MemoryField::HeapSize), Some(Origin::DalvikHeapRow));
        assert_eq!(p.origin(MemoryField::HeapAlloc), Some(Origin::DalvikHeapRow));
    }

    #[test]
    fn test_parse_meminfo_pss_only() {
        let report = parse_meminfo("TOTAL PSS:    45678").unwrap();
        assert_eq!(
            report.metrics,
            crate::models::MemoryMetrics {
                pss: 45678,
                heap_size: 0,
                heap_alloc: 0,
                native_heap: 0,
            }
        );
        assert!(!report.provenance.is_set(MemoryField::HeapSize));
    }

    #[test]
    fn test_parse_meminfo_missing_pss() {
        let output = "\
  Native Heap    10264    10264        0       16    20480    15800     4680
  Dalvik Heap     2136     2136        0        0     8192     3500     4692
";
        assert!(matches!(parse_meminfo(output), Err(CollectError::MissingPss)));
        assert!(matches!(parse_meminfo(""), Err(CollectError::MissingPss)));
    }

    #[test]
    fn test_parse_meminfo_fallback_does_not_override_row() {
        let output = "\
  Dalvik Heap     2136     2136        0        0     8192     3500     4692
 Managed Heap
   Heap Size:    1111
 Managed Heap
   Heap Alloc:   2222
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 0);
        assert_eq!(report.metrics.heap_alloc, 8192);
        assert_eq!(
            report.provenance.origin(MemoryField::HeapSize),
            Some(Origin::DalvikHeapRow)
        );
    }

    #[test]
    fn test_parse_meminfo_fallback_first_wins() {
        let output = "\
 Heap
   Heap Size:    4096
 Heap
   Heap Size:    9999
   Heap Alloc:   2048
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 4096);
        assert_eq!(report.metrics.heap_alloc, 2048);
        assert_eq!(
            report.provenance.origin(MemoryField::HeapAlloc),
            Some(Origin::HeapSummary)
        );
    }

    #[test]
    fn test_parse_meminfo_zero_row_blocks_fallback() {
        let output = "\
  Dalvik Heap        0        0        0        0        0        0        0
 Heap
   Heap Size:    4096
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 0);
        assert!(report.provenance.is_set(MemoryField::HeapSize));
    }

    #[test]
    fn test_parse_meminfo_short_dalvik_row_ignored() {
        let output = "\
  Dalvik Heap     2136     2136
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 0);
        assert!(!report.provenance.is_set(MemoryField::HeapSize));
    }

    #[test]
    fn test_parse_meminfo_dalvik_row_eight_tokens() {
        let output = "\
  Dalvik Heap   2136     1000     2000     8192     3500     4692
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 8192);
        assert_eq!(report.metrics.heap_alloc, 3500);
    }

    #[test]
    fn test_parse_meminfo_dalvik_row_wider_layout_keeps_positions() {
        let output = "\
  Dalvik Heap     2136     2136        0        0     8192     3500     4692
TOTAL PSS: 100
";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.heap_size, 0);
        assert_eq!(report.metrics.heap_alloc, 8192);
        assert_eq!(
            report.provenance.origin(MemoryField::HeapAlloc),
            Some(Origin::DalvikHeapRow)
        );
    }

    #[test]
    fn test_dalvik_extractor_reads_tokens_five_and_six() {
        let values = extract_dalvik_row("Dalvik Heap 10 20 30 40 50 60", None);
        assert_eq!(
            values,
            [
                Some((MemoryField::HeapSize, 40)),
                Some((MemoryField::HeapAlloc, 50))
            ]
        );
        assert_eq!(extract_dalvik_row("Dalvik Heap 10 20 30 40 50", None), [None; 2]);
    }

    #[test]
    fn test_parse_meminfo_crlf_line_endings() {
        let output = "  Native Heap    10264    10264\r\r\nTOTAL PSS:    45678\r\r\n";
        let report = parse_meminfo(output).unwrap();
        assert_eq!(report.metrics.pss, 45678);
        assert_eq!(report.metrics.native_heap, 10264);
    }
}
