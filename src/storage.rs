//! Small key-value storage for view settings that outlive a single run.

use crate::errors::{self, Result};
use crate::panes::Combiner;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::{fs, io};

/// Key of the persisted pane combination mode.
pub const PANE_LOGIC: &str = "Pane Logic";

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Settings kept in a JSON object file. A missing file is an empty store.
#[derive(Debug)]
pub struct FileStorage {
    filename: String,
}

impl FileStorage {
    pub fn new(filename: &str) -> Self {
        FileStorage {
            filename: filename.to_owned(),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.filename) {
            Ok(data) => {
                serde_json::from_str(&data).map_err(|e| errors::load_error(&self.filename, e))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read()?;
        values.insert(key.to_owned(), value.to_owned());
        fs::write(&self.filename, serde_json::to_string_pretty(&values)?)?;
        debug!(target: "courseview", "{}: {key} = {value}", self.filename);
        Ok(())
    }
}

impl Combiner {
    /// Read the persisted combination mode, storing the default if unset.
    pub fn load(storage: &mut dyn Storage) -> Result<Combiner> {
        match storage.get(PANE_LOGIC)? {
            None => {
                let combiner = Combiner::default();
                combiner.store(storage)?;
                Ok(combiner)
            }
            Some(s) => match s.parse() {
                Ok(combiner) => Ok(combiner),
                Err(e) => {
                    warn!(target: "courseview", "ignoring stored pane logic: {e}");
                    Ok(Combiner::default())
                }
            },
        }
    }

    pub fn store(self, storage: &mut dyn Storage) -> Result<()> {
        storage.set(PANE_LOGIC, &self.to_string())
    }
}
