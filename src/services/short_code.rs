//! Short code issuance and alias validation

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{LinktrailError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::{generate_random_code, is_valid_custom_alias};

pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Bounded retry, not a loop-until-success: keeps issuance latency
/// predictable even with a crowded code space or heavy contention.
const MAX_GENERATION_ATTEMPTS: u32 = 10;

pub struct ShortCodeGenerator {
    storage: Arc<SeaOrmStorage>,
}

impl ShortCodeGenerator {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Issue a fresh code at the default length
    pub async fn issue(&self) -> Result<String> {
        self.issue_with_length(DEFAULT_CODE_LENGTH).await
    }

    /// Issue a fresh code, retrying on collision up to the attempt ceiling.
    ///
    /// The availability check here is an optimization; the unique index on
    /// insert remains the authoritative gate (see storage::links).
    pub async fn issue_with_length(&self, length: usize) -> Result<String> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = generate_random_code(length);

            if !self.storage.path_segment_taken(&candidate).await? {
                debug!(
                    "ShortCodeGenerator: issued '{}' (attempt {})",
                    candidate, attempt
                );
                return Ok(candidate);
            }

            warn!(
                "ShortCodeGenerator: candidate collision on attempt {}/{}",
                attempt, MAX_GENERATION_ATTEMPTS
            );
        }

        Err(LinktrailError::exhausted_attempts(format!(
            "Could not find a free short code after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    /// Validate a caller-supplied alias: format here, availability against
    /// the shared namespace below.
    pub async fn validate_alias(&self, alias: &str) -> Result<()> {
        if !is_valid_custom_alias(alias) {
            return Err(LinktrailError::validation(format!(
                "Invalid alias '{}'. Aliases are 3-50 characters of letters, digits, hyphen or underscore.",
                alias
            )));
        }

        if self.storage.path_segment_taken(alias).await? {
            return Err(LinktrailError::conflict(format!(
                "Alias '{}' is already taken",
                alias
            )));
        }

        Ok(())
    }
}
