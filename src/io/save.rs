use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use bincode::serialize_into;
use serde::Serialize;

use crate::automaton::Automaton;
use crate::error::Result;

pub trait Save {
    fn save<P: AsRef<Path>>(&self, save_path: P) -> Result<()>;
}

impl<D, W> Save for Automaton<D, W>
where
    D: Serialize,
    W: Serialize,
{
    fn save<P: AsRef<Path>>(&self, save_path: P) -> Result<()> {
        let save_file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(save_path)?;
        let mut writer = BufWriter::new(save_file);
        serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
