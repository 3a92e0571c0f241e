use std::sync::Arc;

use plasma_db::error::Error;
use plasma_db::schema::Col;
use plasma_db::MemoryDB;

use crate::traits::kv_store::{KVStore, KVStoreRead, KVStoreWrite};

/// Handle on the node's column store. Cheap to clone; every clone shares
/// the same backing database.
#[derive(Clone)]
pub struct Store {
    db: Arc<MemoryDB>,
}

impl Store {
    pub fn new(db: Arc<MemoryDB>) -> Self {
        Store { db }
    }

    /// A store backed by a fresh in-memory database.
    pub fn open_tmp() -> Self {
        Store::new(Arc::new(MemoryDB::default()))
    }
}

impl KVStoreRead for Store {
    fn get(&self, col: Col, key: &[u8]) -> Option<Box<[u8]>> {
        self.db.get(col, key)
    }
}

impl KVStoreWrite for Store {
    fn insert_raw(&self, col: Col, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.db.put(col, key, value)
    }

    fn delete(&self, col: Col, key: &[u8]) -> Result<(), Error> {
        self.db.delete(col, key)
    }
}

impl KVStore for Store {}
