/// Default number of node executions allowed per invocation
pub const DEFAULT_STEP_BUDGET: usize = 25;
/// Smallest step budget a config may set
pub const MIN_STEP_BUDGET: usize = 1;
/// Largest step budget a config may set - guards against runaway cycles
pub const MAX_STEP_BUDGET: usize = 1_000;

/// Default wall-clock limit for one invocation (2 minutes)
pub const DEFAULT_INVOCATION_TIMEOUT_MS: u64 = 120_000;
/// Largest wall-clock limit a config may set (15 minutes)
pub const MAX_INVOCATION_TIMEOUT_MS: u64 = 900_000;

/// Generated text larger than this is not parsed (1 MiB)
pub const DEFAULT_MAX_PARSE_INPUT_BYTES: usize = 1_048_576;

/// Upper bound on keys in a state's metadata map
pub const MAX_METADATA_ENTRIES: usize = 64;

/// Default generation limits for tutoring tasks
pub const DEFAULT_MAX_TOKENS: u32 = 1_024;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ITEM_COUNT: u32 = 5;
