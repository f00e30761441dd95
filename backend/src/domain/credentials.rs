//! Password credential handling: policy checks, salting, hashing and
//! verification.
//!
//! Digests are Argon2id over the plaintext with a per-credential random salt.
//! Both salt and digest are stored hex encoded. Plaintext never leaves this
//! module in any persisted or logged form.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Number of random bytes in a freshly generated salt.
pub const SALT_LEN: usize = 16;
/// Number of bytes in an Argon2id digest.
pub const DIGEST_LEN: usize = 32;

/// Errors raised while producing a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The plaintext failed the named policy rule.
    #[error("password does not satisfy the {rule} rule")]
    PolicyViolation {
        /// Stable name of the first failing rule.
        rule: &'static str,
    },
    /// Argon2 rejected the configured cost parameters.
    #[error("invalid password hashing parameters: {0}")]
    InvalidParameters(String),
    /// The hash computation itself failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A single named predicate in a [`PasswordPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    /// At least this many characters.
    MinLength(usize),
    /// At most this many characters.
    MaxLength(usize),
    /// At least one ASCII uppercase letter.
    RequireUppercase,
    /// At least one ASCII lowercase letter.
    RequireLowercase,
    /// At least one ASCII digit.
    RequireDigit,
    /// At least one character that is neither alphanumeric nor whitespace.
    RequireSymbol,
}

impl PasswordRule {
    /// Stable rule name used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::RequireUppercase => "require_uppercase",
            Self::RequireLowercase => "require_lowercase",
            Self::RequireDigit => "require_digit",
            Self::RequireSymbol => "require_symbol",
        }
    }

    /// Whether `plaintext` satisfies this rule.
    pub fn is_satisfied_by(&self, plaintext: &str) -> bool {
        match *self {
            Self::MinLength(min) => plaintext.chars().count() >= min,
            Self::MaxLength(max) => plaintext.chars().count() <= max,
            Self::RequireUppercase => plaintext.chars().any(|c| c.is_ascii_uppercase()),
            Self::RequireLowercase => plaintext.chars().any(|c| c.is_ascii_lowercase()),
            Self::RequireDigit => plaintext.chars().any(|c| c.is_ascii_digit()),
            Self::RequireSymbol => plaintext
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }
}

/// Ordered set of rules every new password must pass.
///
/// # Examples
/// ```
/// use backend::domain::credentials::{PasswordPolicy, PasswordRule};
///
/// let policy = PasswordPolicy::new(vec![
///     PasswordRule::MinLength(8),
///     PasswordRule::RequireDigit,
/// ]);
/// assert_eq!(policy.first_violation("short"), Some(PasswordRule::MinLength(8)));
/// assert_eq!(policy.first_violation("longenough"), Some(PasswordRule::RequireDigit));
/// assert_eq!(policy.first_violation("longenough1"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    rules: Vec<PasswordRule>,
}

impl PasswordPolicy {
    /// Build a policy that evaluates `rules` in order.
    pub fn new(rules: Vec<PasswordRule>) -> Self {
        Self { rules }
    }

    /// Policy with no rules; every plaintext is accepted.
    pub fn permissive() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[PasswordRule] {
        &self.rules
    }

    /// First rule `plaintext` fails, if any.
    pub fn first_violation(&self, plaintext: &str) -> Option<PasswordRule> {
        self.rules
            .iter()
            .copied()
            .find(|rule| !rule.is_satisfied_by(plaintext))
    }

    /// Check `plaintext` against every rule.
    pub fn check(&self, plaintext: &str) -> Result<(), CredentialError> {
        match self.first_violation(plaintext) {
            Some(rule) => Err(CredentialError::PolicyViolation { rule: rule.name() }),
            None => Ok(()),
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(vec![PasswordRule::MinLength(8), PasswordRule::MaxLength(128)])
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Stored credential material: hex digest plus the hex salt it was made with.
///
/// `Debug` output redacts both values.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    hash: String,
    salt: String,
}

impl PasswordCredential {
    /// Rehydrate a credential loaded from storage.
    pub fn new(hash: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            salt: salt.into(),
        }
    }

    /// Hex-encoded digest.
    pub fn hash(&self) -> &str {
        self.hash.as_str()
    }

    /// Hex-encoded salt.
    pub fn salt(&self) -> &str {
        self.salt.as_str()
    }

    /// True when either half is blank.
    pub fn is_blank(&self) -> bool {
        self.hash.trim().is_empty() || self.salt.trim().is_empty()
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

/// Salts, hashes and verifies passwords under a [`PasswordPolicy`].
///
/// # Examples
/// ```
/// use backend::domain::credentials::{CredentialHasher, HashingCost, PasswordPolicy};
///
/// let cost = HashingCost { memory_kib: 64, iterations: 1, parallelism: 1 };
/// let hasher = CredentialHasher::new(PasswordPolicy::default(), cost).unwrap();
/// let credential = hasher.hash_password("correct horse").unwrap();
/// assert!(hasher.verify("correct horse", credential.salt(), credential.hash()));
/// assert!(!hasher.verify("wrong horse", credential.salt(), credential.hash()));
/// ```
#[derive(Clone)]
pub struct CredentialHasher {
    policy: PasswordPolicy,
    argon2: Argon2<'static>,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Build a hasher, validating the Argon2 cost parameters.
    pub fn new(policy: PasswordPolicy, cost: HashingCost) -> Result<Self, CredentialError> {
        let params = Params::new(
            cost.memory_kib,
            cost.iterations,
            cost.parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|err| CredentialError::InvalidParameters(err.to_string()))?;
        Ok(Self {
            policy,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Active password policy.
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Check `plaintext` against the policy, then salt and hash it.
    pub fn hash_password(&self, plaintext: &str) -> Result<PasswordCredential, CredentialError> {
        self.policy.check(plaintext)?;
        let salt = Self::generate_salt();
        let hash = self.hash(plaintext, &salt)?;
        Ok(PasswordCredential { hash, salt })
    }

    /// Fresh salt from the operating system CSPRNG, hex encoded.
    pub fn generate_salt() -> String {
        let mut bytes = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Deterministic digest of `plaintext` under `salt`, hex encoded.
    pub fn hash(&self, plaintext: &str, salt: &str) -> Result<String, CredentialError> {
        let mut out = Zeroizing::new([0_u8; DIGEST_LEN]);
        self.argon2
            .hash_password_into(plaintext.as_bytes(), salt.as_bytes(), out.as_mut())
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;
        Ok(hex::encode(out.as_ref()))
    }

    /// Recompute the digest and compare it with `expected` in constant time.
    ///
    /// Any hashing failure counts as a mismatch.
    pub fn verify(&self, plaintext: &str, salt: &str, expected: &str) -> bool {
        match self.hash(plaintext, salt) {
            Ok(actual) => constant_time_eq(actual.as_bytes(), expected.as_bytes()),
            Err(_) => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
