pub mod merkle;
pub mod wallet;
