//! Queued remote operations awaiting acknowledgement.

use serde::{Deserialize, Serialize};

/// The fixed set of remote write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    RegisterPatient,
    AddVitals,
    AddVisit,
}

impl Endpoint {
    /// Request path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::RegisterPatient => "patients/register",
            Endpoint::AddVitals => "vital/add",
            Endpoint::AddVisit => "visits/add",
        }
    }

    /// Stable tag stored in the queue table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::RegisterPatient => "register_patient",
            Endpoint::AddVitals => "add_vitals",
            Endpoint::AddVisit => "add_visit",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "register_patient" => Some(Endpoint::RegisterPatient),
            "add_vitals" => Some(Endpoint::AddVitals),
            "add_visit" => Some(Endpoint::AddVisit),
            _ => None,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A remote write that has not been acknowledged yet.
///
/// `endpoint`, `payload` and `created_at` are fixed at enqueue time; only
/// `attempt_count` and `last_error` change afterwards. The payload is a JSON
/// snapshot of the request body, never rebuilt from current record state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOperation {
    /// Local queue ID, never sent remotely
    pub id: i64,
    pub endpoint: Endpoint,
    /// Serialized request body
    pub payload: String,
    /// Logical enqueue time; replay order is ascending
    pub created_at: i64,
    /// Number of failed replay attempts
    pub attempt_count: u32,
    /// Most recent failure, for diagnostics
    pub last_error: Option<String>,
    /// Wall-clock enqueue time (RFC 3339), used only for age-based purge
    pub enqueued_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_tags_round_trip() {
        for endpoint in [Endpoint::RegisterPatient, Endpoint::AddVitals, Endpoint::AddVisit] {
            assert_eq!(Endpoint::from_tag(endpoint.as_str()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_tag("patients/register"), None);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::AddVitals.path(), "vital/add");
        assert_eq!(Endpoint::AddVisit.to_string(), "visits/add");
    }
}
