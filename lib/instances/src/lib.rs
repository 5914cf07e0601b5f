pub use anyhow::Result;

use std::fmt;
use fnv::{FnvHashMap as Map, FnvHashSet as Set};

#[derive(Debug, Clone)]
pub enum Error {
    UnknownInstanceName,
    IndexOutOfRange,
    InvalidInstance(String),
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstance(msg) => write!(f, "invalid instance: {}", msg),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

impl std::error::Error for Error {}


pub mod dataset;
pub mod raw;

pub mod parsers;
