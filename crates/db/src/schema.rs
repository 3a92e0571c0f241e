//! The schema include constants define the low level database column families.

/// Column families alias type
pub type Col = &'static str;
/// Total column number
pub const COLUMNS: u32 = 6;
/// Column store meta data
pub const COLUMN_META: Col = "0";
/// Column store block bodies keyed by number and hash
pub const COLUMN_BLOCK_BODY: Col = "1";
/// Column store block receipts keyed by number and hash
pub const COLUMN_BLOCK_RECEIPTS: Col = "2";
/// Column store transaction lookup entries keyed by transaction hash
pub const COLUMN_TX_LOOKUP: Col = "3";
/// Column store invalid exit receipt lookup entries keyed by fork, number and hash
pub const COLUMN_INVALID_EXIT_RECEIPTS_LOOKUP: Col = "4";
/// Column store compressed bloom bits keyed by bit, section and head hash
pub const COLUMN_BLOOM_BITS: Col = "5";

/// Tracks the last root-chain block whose events were fully handled
pub const META_LAST_PROCESSED_ROOTCHAIN_BLOCK_KEY: &[u8] =
    b"LAST_PROCESSED_ROOTCHAIN_BLOCK";
