use crate::ConfigError;
use std::collections::HashSet;
use std::sync::Arc;

/// Lazy iterator over every identifier of a fixed length
///
/// Identifiers are produced in lexicographic order over the alphabet's own
/// character order (the Cartesian power `A^L`). Only the current position is
/// held in memory, so arbitrarily large spaces can be streamed.
#[derive(Debug, Clone)]
pub struct Candidates {
    alphabet: Arc<[char]>,
    /// Odometer of alphabet positions for the next identifier
    indices: Vec<usize>,
    /// Identifiers not yet yielded, when the total fits in a u128
    remaining: Option<u128>,
    exhausted: bool,
}

/// Creates the candidate sequence for an alphabet and identifier length
///
/// # Arguments
///
/// * `alphabet` - The characters identifiers are built from, in enumeration order
/// * `length` - Number of characters in every identifier (must be >= 1)
///
/// # Returns
///
/// * `Ok(Candidates)` - A fresh sequence positioned at the first identifier
/// * `Err(ConfigError::InvalidConfiguration)` - Empty alphabet, repeated
///   characters, or zero length
pub fn generate(alphabet: &str, length: usize) -> Result<Candidates, ConfigError> {
    if length < 1 {
        return Err(ConfigError::InvalidConfiguration(format!(
            "identifier length must be >= 1, got {}",
            length
        )));
    }

    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(ConfigError::InvalidConfiguration(
            "alphabet cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(chars.len());
    if let Some(dup) = chars.iter().find(|c| !seen.insert(**c)) {
        return Err(ConfigError::InvalidConfiguration(format!(
            "alphabet contains '{}' more than once",
            dup
        )));
    }

    Ok(Candidates {
        remaining: space_size(chars.len(), length),
        alphabet: chars.into(),
        indices: vec![0; length],
        exhausted: false,
    })
}

/// Number of identifiers in the space `alphabet_len ^ length`
///
/// Returns `None` when the count does not fit in a u128.
pub fn space_size(alphabet_len: usize, length: usize) -> Option<u128> {
    let exp = u32::try_from(length).ok()?;
    (alphabet_len as u128).checked_pow(exp)
}

impl Candidates {
    /// Identifier length
    pub fn length(&self) -> usize {
        self.indices.len()
    }

    /// Number of distinct characters in the alphabet
    pub fn alphabet_len(&self) -> usize {
        self.alphabet.len()
    }

    /// Advances the odometer; marks the sequence exhausted on final carry
    fn advance(&mut self) {
        let base = self.alphabet.len();
        for slot in self.indices.iter_mut().rev() {
            *slot += 1;
            if *slot < base {
                return;
            }
            *slot = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }

        let current: String = self.indices.iter().map(|&i| self.alphabet[i]).collect();
        self.advance();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => match usize::try_from(n) {
                Ok(n) => (n, Some(n)),
                Err(_) => (usize::MAX, None),
            },
            None => (usize::MAX, None),
        }
    }
}

impl std::iter::FusedIterator for Candidates {}
