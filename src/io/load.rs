use std::fs;
use std::io::BufReader;
use std::path::Path;

use bincode::deserialize_from;
use serde::de::DeserializeOwned;

use crate::automaton::Automaton;
use crate::distribution::ElementDistribution;
use crate::error::Result;
use crate::weight::Weight;

pub trait Load {
    fn load<P: AsRef<Path>>(load_path: P) -> Result<Self>
    where
        Self: Sized;
}

// load_path should be a file written by `Save::save`.
impl<D, W> Load for Automaton<D, W>
where
    D: ElementDistribution + DeserializeOwned,
    W: Weight + DeserializeOwned,
{
    fn load<P: AsRef<Path>>(load_path: P) -> Result<Self> {
        let file = fs::OpenOptions::new().read(true).open(load_path)?;
        Ok(deserialize_from(BufReader::new(file))?)
    }
}
