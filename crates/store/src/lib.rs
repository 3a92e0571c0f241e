mod store_impl;
pub mod traits;

pub use store_impl::Store;
