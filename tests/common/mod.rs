#![allow(dead_code)]

mod mocks;

pub use mocks::MockFile;

use std::{env::temp_dir, fs, path::PathBuf};

use rand::distr::{Alphanumeric, SampleString};

/// Writes `content` to a randomly named file in the temp directory.
pub fn write_temp_xml(content: &str) -> PathBuf {
    let path = temp_path("xml");
    fs::write(&path, content).expect("Failed to write XML file");
    path
}

/// A fresh, not yet existing path in the temp directory.
pub fn temp_path(extension: &str) -> PathBuf {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    temp_dir().join(format!("{}.{}", file_name, extension))
}
