/// Default capacity of a scheduler's task queue
pub const DEFAULT_BACKLOG: usize = 1024;
/// Fallback worker count when the host parallelism cannot be detected
pub const FALLBACK_PARALLEL: usize = 4;
/// Default TPS controller sampling period (milliseconds)
pub const DEFAULT_PARALLEL_TICK_MS: u64 = 100;
/// Default number of workers added per controller tick
pub const DEFAULT_PARALLEL_INCREASE: usize = 1;
/// Default capacity of the controller's report and parallel channels
pub const DEFAULT_CHANNEL_BACKLOG: usize = 1024;
/// Negative TPS limit disables throttling
pub const UNLIMITED_TPS: f64 = -1.0;
/// Default coroutine yield/resume budget (milliseconds) - 30 seconds
pub const DEFAULT_COROUTINE_TIMEOUT_MS: u64 = 30_000;
/// Default wait for a reply to a client request (milliseconds)
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 30_000;
/// Name of the root bus when the configuration does not give one
pub const DEFAULT_BUS_NAME: &str = "bus";

/// Worker count matching the host, falling back to [`FALLBACK_PARALLEL`].
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_PARALLEL)
}
