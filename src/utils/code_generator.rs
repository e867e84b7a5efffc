//! Short code generation.
//!
//! Codes are drawn uniformly from the base62 alphabet using the thread-local
//! CSPRNG, so consecutive codes carry no guessable sequence.

use rand::Rng;

use crate::domain::entities::ShortCode;
use crate::domain::entities::short_code::{ALPHABET, MAX_LENGTH, MIN_LENGTH};

/// Default code length: 62^6 ≈ 56.8 billion combinations.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Source of candidate short codes.
///
/// Implementations do not check uniqueness; the service pairs every candidate
/// with an atomic store insert and asks again on collision.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> ShortCode;
}

/// Random base62 code generator.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    /// Creates a generator for codes of `length` characters.
    ///
    /// The length is clamped into the 6–8 range accepted by [`ShortCode`].
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_LENGTH, MAX_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();

        ShortCode::new_unchecked(code)
    }
}
