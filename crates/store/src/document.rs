use serde::{Deserialize, Serialize};

use waygate_common::SessionState;

/// Persisted per-tenant status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub status: SessionState,
    /// Rendered pairing payload; present only while `awaiting_pairing`.
    pub qr: Option<String>,
    pub error: Option<String>,
    /// Unix milliseconds, non-decreasing per tenant.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl StatusDocument {
    /// Base document merged into when a tenant has no document yet.
    pub(crate) fn empty() -> Self {
        Self {
            status: SessionState::Uninitialized,
            qr: None,
            error: None,
            updated_at: 0,
        }
    }

    /// Apply `patch`, bumping `updatedAt` to `now` (never backwards).
    pub(crate) fn apply(&mut self, patch: &StatusPatch, now: i64) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(qr) = &patch.qr {
            self.qr = qr.clone();
        }
        if let Some(error) = &patch.error {
            self.error = error.clone();
        }
        self.updated_at = self.updated_at.max(now);
    }
}

/// A partial update to a status document.
///
/// Outer `None` means "leave the field alone"; `Some(None)` writes an
/// explicit null. Use the transition constructors rather than building
/// patches by hand — they encode the field set each lifecycle transition
/// is allowed to touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: Option<SessionState>,
    pub qr: Option<Option<String>>,
    pub error: Option<Option<String>>,
}

impl StatusPatch {
    /// A session is being (re)constructed.
    pub fn initializing() -> Self {
        Self {
            status: Some(SessionState::Initializing),
            qr: Some(None),
            error: Some(None),
        }
    }

    /// Pairing code ready: stores the rendered payload, clears any error.
    pub fn pairing(payload: String) -> Self {
        Self {
            status: Some(SessionState::AwaitingPairing),
            qr: Some(Some(payload)),
            error: Some(None),
        }
    }

    /// Session authorized and connected.
    pub fn connected() -> Self {
        Self {
            status: Some(SessionState::Connected),
            qr: Some(None),
            error: Some(None),
        }
    }

    pub fn disconnected(reason: String) -> Self {
        Self {
            status: Some(SessionState::Disconnected),
            qr: Some(None),
            error: Some(Some(reason)),
        }
    }

    pub fn auth_failed(message: String) -> Self {
        Self {
            status: Some(SessionState::AuthFailed),
            qr: Some(None),
            error: Some(Some(message)),
        }
    }

    /// Unrecoverable initialization error.
    pub fn error(message: String) -> Self {
        Self {
            status: Some(SessionState::Error),
            qr: Some(None),
            error: Some(Some(message)),
        }
    }
}

/// Current wall clock in unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_clears_qr_on_every_non_pairing_transition() {
        for patch in [
            StatusPatch::initializing(),
            StatusPatch::connected(),
            StatusPatch::disconnected("gone".into()),
            StatusPatch::auth_failed("denied".into()),
            StatusPatch::error("boom".into()),
        ] {
            assert_eq!(patch.qr, Some(None), "{patch:?}");
        }
    }

    #[test]
    fn apply_preserves_untouched_fields() {
        let mut doc = StatusDocument::empty();
        doc.apply(&StatusPatch::pairing("payload".into()), 10);
        assert_eq!(doc.qr.as_deref(), Some("payload"));

        // A patch that only sets status leaves qr alone.
        let status_only = StatusPatch {
            status: Some(SessionState::Connected),
            qr: None,
            error: None,
        };
        doc.apply(&status_only, 20);
        assert_eq!(doc.qr.as_deref(), Some("payload"));
        assert_eq!(doc.status, SessionState::Connected);
    }

    #[test]
    fn updated_at_never_goes_backwards() {
        let mut doc = StatusDocument::empty();
        doc.apply(&StatusPatch::connected(), 100);
        doc.apply(&StatusPatch::disconnected("x".into()), 50);
        assert_eq!(doc.updated_at, 100);
    }

    #[test]
    fn document_wire_shape() {
        let doc = StatusDocument {
            status: SessionState::AwaitingPairing,
            qr: Some("data:image/svg+xml;base64,AA".into()),
            error: None,
            updated_at: 1234,
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["status"], "awaiting_pairing");
        assert_eq!(v["updatedAt"], 1234);
        assert!(v["error"].is_null());
    }
}
