//! Message and entry types including core domain identifiers.

use crate::error::ValidationError;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Tenant or application partition tag attached to entries and messages
///
/// The empty namespace is valid and is what entries carry when the producer
/// does not name one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Namespace(String);

impl Namespace {
    pub const MAX_LENGTH: usize = 256;

    /// Create new namespace with validation
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.chars().count() > Self::MAX_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "namespace".to_string(),
                message: format!("maximum {} characters", Self::MAX_LENGTH),
            });
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "namespace".to_string(),
                message: "control characters are not allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get namespace as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Namespace {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier assigned to an entry when it is published
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    /// Generate new random entry ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get entry ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "entry_id".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

/// Identity of a processor competing for entry leases
///
/// Never empty: "no processor" is expressed by [`Lease::Unclaimed`], not by
/// a blank identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ProcessorId(String);

impl ProcessorId {
    pub const MAX_LENGTH: usize = 128;

    /// Create new processor ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ValidationError::Required {
                field: "processor_id".to_string(),
            });
        }

        if id.len() > Self::MAX_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "processor_id".to_string(),
                message: format!("maximum {} characters", Self::MAX_LENGTH),
            });
        }

        if !id.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "processor_id".to_string(),
                message: "only ASCII printable characters allowed".to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Generate a random processor ID of the form `processor-<uuid>`
    pub fn generate() -> Self {
        Self(format!("processor-{}", uuid::Uuid::new_v4()))
    }

    /// Get processor ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ProcessorId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ProcessorId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current wall-clock time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create timestamp from DateTime
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Timestamp offset by `duration`, saturating at the representable range
    pub fn add_duration(&self, duration: Duration) -> Self {
        match self.0.checked_add_signed(duration) {
            Some(dt) => Self(dt),
            None if duration < Duration::zero() => Self(DateTime::<Utc>::MIN_UTC),
            None => Self(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Strict ordering: a timestamp is not before itself
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f UTC"))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dt = s.parse::<DateTime<Utc>>()?;
        Ok(Self::from_datetime(dt))
    }
}

// ============================================================================
// Lease State
// ============================================================================

/// Ownership state of a stored entry
///
/// A lease is live while the current time is strictly before `until`. An
/// expired lease still names its last holder, which keeps the entry visible
/// to that holder's fetches until another processor claims it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lease {
    #[default]
    Unclaimed,
    Held {
        processor_id: ProcessorId,
        until: Timestamp,
    },
}

impl Lease {
    /// Check whether the lease still excludes other claimers at `now`
    pub fn is_live(&self, now: &Timestamp) -> bool {
        match self {
            Self::Unclaimed => false,
            Self::Held { until, .. } => now.is_before(until),
        }
    }

    /// Check whether a claim sweep at `now` may take this entry
    pub fn is_claimable(&self, now: &Timestamp) -> bool {
        !self.is_live(now)
    }

    /// Get the current (or most recent) holder, regardless of expiry
    pub fn owner(&self) -> Option<&ProcessorId> {
        match self {
            Self::Unclaimed => None,
            Self::Held { processor_id, .. } => Some(processor_id),
        }
    }

    /// Check whether `processor_id` holds this lease, regardless of expiry
    pub fn is_owned_by(&self, processor_id: &ProcessorId) -> bool {
        self.owner() == Some(processor_id)
    }

    /// Get the lease deadline if the entry was ever claimed
    pub fn deadline(&self) -> Option<Timestamp> {
        match self {
            Self::Unclaimed => None,
            Self::Held { until, .. } => Some(*until),
        }
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// A message handed to the outbox by a producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque ordering/partitioning key
    #[serde(with = "bytes_serde")]
    pub key: Bytes,
    #[serde(with = "bytes_serde")]
    pub payload: Bytes,
}

impl Message {
    /// Create new message from key and payload
    pub fn new(key: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}

/// An entry handed to the processor that holds its lease
///
/// Lease metadata is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedEntry {
    pub namespace: Namespace,
    pub id: EntryId,
    #[serde(with = "bytes_serde")]
    pub key: Bytes,
    #[serde(with = "bytes_serde")]
    pub payload: Bytes,
}

impl ClaimedEntry {
    /// Rebuild the producer message this entry was created from
    pub fn to_message(&self) -> Message {
        Message {
            key: self.key.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// A message together with the namespace it was published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedMessage {
    pub message: Message,
    pub namespace: Namespace,
}

/// Custom serialization for Bytes
mod bytes_serde {
    use base64::{engine::general_purpose, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = general_purpose::STANDARD.encode(bytes);
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)?;
        Ok(Bytes::from(decoded))
    }
}
