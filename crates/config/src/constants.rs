/// Gas limit of submitNRB / submitORB / challengeExit transactions.
pub const SUBMIT_BLOCK_GAS_LIMIT: u64 = 4_000_000;
/// Fixed gas price of challengeExit transactions, in wei. Challenges do not
/// participate in the adaptive adjustment.
pub const SUBMIT_BLOCK_GAS_PRICE: u64 = 10_000_000_000;
/// Gas limit of materialized request transactions.
pub const REQUEST_TX_GAS_LIMIT: u64 = 500_000;
/// Gas price of materialized request transactions, in wei.
pub const REQUEST_TX_GAS_PRICE: u64 = 10_000_000_000;
/// Default wei attached to a block submission.
pub const DEFAULT_COST_NRB: u64 = 1_000_000_000;
/// Default starting gas price of submissions, in wei.
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;
/// Default seconds between resubmit checks while a submission is pending.
pub const DEFAULT_PENDING_INTERVAL_SECS: u64 = 10;
/// Seconds between root chain liveness probes.
pub const PING_INTERVAL_SECS: u64 = 3;
