//! In-memory column store.
//!
//! The node's production engine sits behind the same read/write surface;
//! this implementation backs development nodes and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Error;
use crate::schema::{Col, COLUMNS};

pub struct MemoryDB {
    inner: Vec<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl Default for MemoryDB {
    fn default() -> Self {
        Self::open(COLUMNS)
    }
}

impl MemoryDB {
    pub fn open(columns: u32) -> Self {
        let mut inner = Vec::default();
        inner.resize_with(columns as usize, || Mutex::new(Default::default()));
        MemoryDB { inner }
    }

    fn column(&self, col: Col) -> Result<&Mutex<HashMap<Vec<u8>, Vec<u8>>>, Error> {
        let index: usize = col
            .parse()
            .map_err(|_| Error::UnknownColumn(col.to_string()))?;
        self.inner
            .get(index)
            .ok_or_else(|| Error::UnknownColumn(col.to_string()))
    }

    pub fn get(&self, col: Col, key: &[u8]) -> Option<Box<[u8]>> {
        let column = self.column(col).ok()?;
        let column = column.lock().expect("memory db lock");
        column.get(key).map(|value| value.clone().into_boxed_slice())
    }

    pub fn put(&self, col: Col, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let column = self.column(col)?;
        let mut column = column.lock().expect("memory db lock");
        column.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    pub fn delete(&self, col: Col, key: &[u8]) -> Result<(), Error> {
        let column = self.column(col)?;
        let mut column = column.lock().expect("memory db lock");
        column.remove(key);
        Ok(())
    }
}
