use serde::{Deserialize, Serialize};

/// Complaint-scoped events. Each one fans out to a per-recipient
/// notification row when its toggle is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintEventType {
    ComplaintCreated,
    OfficerAssigned,
    OfficerReassigned,
    OfficerUnassigned,
    ExtensionRequested,
    ExtensionApproved,
    ExtensionRejected,
    ComplaintClosed,
    NoteAdded,
    OfficerNoteAdded,
    DocumentAdded,
    OfficerDocumentAdded,
}

impl ComplaintEventType {
    /// Declaration order is the canonical order; the settings listing
    /// follows it.
    pub const ALL: [ComplaintEventType; 12] = [
        ComplaintEventType::ComplaintCreated,
        ComplaintEventType::OfficerAssigned,
        ComplaintEventType::OfficerReassigned,
        ComplaintEventType::OfficerUnassigned,
        ComplaintEventType::ExtensionRequested,
        ComplaintEventType::ExtensionApproved,
        ComplaintEventType::ExtensionRejected,
        ComplaintEventType::ComplaintClosed,
        ComplaintEventType::NoteAdded,
        ComplaintEventType::OfficerNoteAdded,
        ComplaintEventType::DocumentAdded,
        ComplaintEventType::OfficerDocumentAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintEventType::ComplaintCreated => "complaint_created",
            ComplaintEventType::OfficerAssigned => "officer_assigned",
            ComplaintEventType::OfficerReassigned => "officer_reassigned",
            ComplaintEventType::OfficerUnassigned => "officer_unassigned",
            ComplaintEventType::ExtensionRequested => "extension_requested",
            ComplaintEventType::ExtensionApproved => "extension_approved",
            ComplaintEventType::ExtensionRejected => "extension_rejected",
            ComplaintEventType::ComplaintClosed => "complaint_closed",
            ComplaintEventType::NoteAdded => "note_added",
            ComplaintEventType::OfficerNoteAdded => "officer_note_added",
            ComplaintEventType::DocumentAdded => "document_added",
            ComplaintEventType::OfficerDocumentAdded => "officer_document_added",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Events the assigned officer is notified about in addition to the
    /// admin audience: assignment changes and the extension lifecycle.
    /// Note/document events route to admins only.
    pub fn officer_relevant(&self) -> bool {
        matches!(
            self,
            ComplaintEventType::OfficerAssigned
                | ComplaintEventType::OfficerReassigned
                | ComplaintEventType::OfficerUnassigned
                | ComplaintEventType::ExtensionRequested
                | ComplaintEventType::ExtensionApproved
                | ComplaintEventType::ExtensionRejected
        )
    }
}

/// Broadcast events visible to the whole admin role. A single row is
/// written per event, with no per-user fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonEventType {
    MeetingRequested,
}

impl CommonEventType {
    pub const ALL: [CommonEventType; 1] = [CommonEventType::MeetingRequested];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommonEventType::MeetingRequested => "meeting_requested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

pub fn is_notifiable_event_type(s: &str) -> bool {
    ComplaintEventType::parse(s).is_some()
}

pub fn is_common_notifiable_event_type(s: &str) -> bool {
    CommonEventType::parse(s).is_some()
}
