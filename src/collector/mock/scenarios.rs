//! Pre-built device scenarios for testing.
//!
//! Each scenario is a `MockExecutor` answering the commands a sampling pass
//! issues for [`PACKAGE`], using output captured from real devices.

use super::executor::MockExecutor;

/// Package name used by every scenario.
pub const PACKAGE: &str = "com.example.app";

/// Process id the scenarios report for [`PACKAGE`].
pub const PID: &str = "12345";

const DEVICE: &str = "emulator-5554";

const PIDOF: &str = "pidof com.example.app";
const CAT_STAT: &str = "cat /proc/12345/stat";
const TOP: &str = "top -b -n 1 -p 12345";
const DUMPSYS: &str = "dumpsys meminfo com.example.app";

/// utime = 4523, stime = 1287 ticks.
const STAT: &str = "12345 (com.example.app) S 567 567 0 0 -1 1077952832 123456 789 0 \
4523 1287 0 0 10 -10 45 0 98765 1638400000 45000 18446744073709551615 1 1 0 0 0 0 4612 1 \
1073775864 0 0 0 17 3 0 0 0 0 0 0 0 0 0 0 0 0\n";

const TOP_LEGACY: &str = "\


User 5%, System 3%, IOW 0%, IRQ 0%
User 38 + Nice 0 + Sys 22 + Idle 680 + IOW 0 + IRQ 0 + SIRQ 2 = 742

  PID PR CPU% S  #THR     VSS     RSS PCY UID      Name
12345  2   7% S    45 1638400K  98000K  fg u0_a123  com.example.app
";

const TOP_NO_PERCENT: &str = "\
Tasks: 1 total,   0 running,   1 sleeping,   0 stopped,   0 zombie
  Mem:  3.8G total,  3.6G used,  200M free,   12M buffers
 Swap:  2.0G total,  100M used,  1.9G free,  1.2G cached
  PID USER         PR  NI VIRT  RES  SHR S[%CPU] %MEM     TIME+ ARGS
12345 u0_a123      10 -10 1.2G  98M  45M S  2.5   1.2   0:12.34 com.example.app
";

const MEMINFO: &str = "\
Applications Memory Usage (in Kilobytes):
Uptime: 12345678 Realtime: 12345678

** MEMINFO in pid 12345 [com.example.app] **
                   Pss  Private  Private  SwapPss     Heap     Heap     Heap
                 Total    Dirty    Clean    Dirty     Size    Alloc     Free
                ------   ------   ------   ------   ------   ------   ------
  Native Heap    10264    10264        0       16    20480    15800     4680
  Dalvik Heap     2136     2136        0        0     8192     3500     4692
 Dalvik Other      512      512        0        0
        Stack      300      300        0        0
       Ashmem        2        0        0        0
    Other dev       12        0       12        0
     .so mmap     4567      212     2800        0
    .apk mmap      300        0      120        0
    .dex mmap     5000        4     3900        0
    Other mmap      64        4       20        0
      Unknown      900      900        0        0
        TOTAL    45678    30000     5000       16    28672    19300     9372

 App Summary
                       Pss(KB)
                        ------
           Java Heap:     4500
         Native Heap:    10264
                Code:     7036
               Stack:      300
            Graphics:        0
       Private Other:     1200
              System:    21338

           TOTAL PSS:    45678   TOTAL RSS:    98000   TOTAL SWAP PSS:       16

 Objects
               Views:       12         ViewRootImpl:        1
         AppContexts:        3           Activities:        1
";

const MEMINFO_LEGACY: &str = "\
** MEMINFO in pid 12345 [com.example.app] **
  Native Heap    10264
 Managed Heap
   Heap Size:     6144
   Heap Alloc:    2048
TOTAL PSS:    30123
";

#[allow(dead_code)]
impl MockExecutor {
    /// A running app whose every diagnostic source answers normally.
    ///
    /// Expected metrics: usage 5% (the first percentage `top` prints),
    /// userTime 45230 ms, systemTime 12870 ms, pss 45678, heapSize 0,
    /// heapAlloc 8192, nativeHeap 10264.
    pub fn typical_app() -> Self {
        let mut exec = Self::new(DEVICE);
        exec.add_output(PIDOF, format!("{}\n", PID));
        exec.add_output(CAT_STAT, STAT);
        exec.add_output(TOP, TOP_LEGACY);
        exec.add_output(DUMPSYS, MEMINFO);
        exec
    }

    /// `top` prints usage without a `%` suffix, so usage stays unknown.
    pub fn with_percentless_top() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(TOP, TOP_NO_PERCENT);
        exec
    }

    /// `top` is not available on the device.
    pub fn without_top() -> Self {
        let mut exec = Self::typical_app();
        exec.remove(TOP);
        exec
    }

    /// Process name contains spaces.
    pub fn with_spaced_process_name() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(CAT_STAT, STAT.replace("(com.example.app)", "(my app process)"));
        exec
    }

    /// `/proc/[pid]/stat` was cut short.
    pub fn with_truncated_stat() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(CAT_STAT, "12345 (com.example.app) S 567 567 0 0 -1\n");
        exec
    }

    /// `/proc/[pid]/stat` is not readable.
    pub fn with_unreadable_stat() -> Self {
        let mut exec = Self::typical_app();
        exec.add_exit(
            CAT_STAT,
            1,
            "",
            "cat: /proc/12345/stat: Permission denied",
        );
        exec
    }

    /// Older report without the heap table, heap values in a summary block.
    pub fn with_legacy_meminfo() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(DUMPSYS, MEMINFO_LEGACY);
        exec
    }

    /// `dumpsys` ran but did not recognize the process.
    pub fn with_empty_meminfo() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(DUMPSYS, "No process found for: com.example.app\n");
        exec
    }

    /// The app runs several processes (e.g. a `:remote` service).
    pub fn with_multiple_pids() -> Self {
        let mut exec = Self::typical_app();
        exec.add_output(PIDOF, format!("{} 12400\n", PID));
        exec
    }

    /// The app is installed but not running: `pidof` exits 1 silently.
    pub fn app_not_running() -> Self {
        let mut exec = Self::new(DEVICE);
        exec.add_exit(PIDOF, 1, "", "");
        exec
    }

    /// Older `pidof` builds exit 0 with empty output when nothing matches.
    pub fn app_not_running_empty_output() -> Self {
        let mut exec = Self::new(DEVICE);
        exec.add_output(PIDOF, "  \n");
        exec
    }

    /// The device dropped off the bus.
    pub fn device_offline() -> Self {
        let mut exec = Self::new(DEVICE);
        exec.add_exit(PIDOF, 1, "", "error: device offline");
        exec.add_exit(DUMPSYS, 1, "", "error: device offline");
        exec
    }
}
