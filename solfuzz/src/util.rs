use anyhow::{Context, Result};
use rand::Rng;
use serde::de::DeserializeOwned;
use std::{fs::File, io::BufReader, path::Path};

use crate::constants::ALPHABET;

/// Reads and deserializes a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Uniform index into a collection of `len` elements, `None` when it is empty.
pub(crate) fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.random_range(0..len))
}

pub(crate) fn random_alpha_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    ALPHABET[rng.random_range(0..ALPHABET.len())] as char
}

/// Byte offset of the `n`th character of `s`, or `s.len()` past the end.
pub(crate) fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}
