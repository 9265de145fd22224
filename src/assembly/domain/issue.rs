//! Issues reported against assembly tasks.

use super::{
    IssueId, ParseIssueStatusError, PersonId, ReplacementOrderId, SupplierId, TaskDomainError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of defect found on site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Item arrived or became broken.
    Broken,
    /// Item is missing from the delivery.
    Missing,
    /// Item does not match the order.
    Wrong,
    /// Surrounding site or item was damaged.
    Damage,
    /// Anything else.
    Other,
}

impl IssueType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Broken => "broken",
            Self::Missing => "missing",
            Self::Wrong => "wrong",
            Self::Damage => "damage",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for IssueType {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "broken" => Ok(Self::Broken),
            "missing" => Ok(Self::Missing),
            "wrong" => Ok(Self::Wrong),
            "damage" => Ok(Self::Damage),
            "other" => Ok(Self::Other),
            _ => Err(TaskDomainError::InvalidIssueType(value.to_owned())),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Party the defect is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultSource {
    /// Manufacturing defect.
    Production,
    /// Caused by the assembly crew.
    Team,
    /// Nobody's fault.
    Accident,
}

impl FaultSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Team => "team",
            Self::Accident => "accident",
        }
    }
}

impl TryFrom<&str> for FaultSource {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "team" => Ok(Self::Team),
            "accident" => Ok(Self::Accident),
            _ => Err(TaskDomainError::InvalidFaultSource(value.to_owned())),
        }
    }
}

impl fmt::Display for FaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Issue is open and blocks completion.
    Pending,
    /// Issue has been dealt with.
    Resolved,
}

impl IssueStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

impl TryFrom<&str> for IssueStatus {
    type Error = ParseIssueStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseIssueStatusError(value.to_owned())),
        }
    }
}

/// Progress of the replacement order attached to an issue.
///
/// The order is requested after the issue is persisted, so an issue can sit
/// in `Queued` until the order sink accepts the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReplacementState {
    /// A replacement was requested but no order exists yet.
    Queued {
        /// Supplier hint to forward with the request.
        supplier_id: Option<SupplierId>,
    },
    /// The production subsystem created the order.
    Ordered {
        /// Supplier hint forwarded with the request.
        supplier_id: Option<SupplierId>,
        /// Identifier of the created production order.
        order_id: ReplacementOrderId,
    },
}

/// Validated description of a defect, as supplied by the crew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDetails {
    kind: IssueType,
    item: String,
    quantity: u32,
    fault_source: FaultSource,
    responsible_person_id: Option<PersonId>,
    photo_url: Option<String>,
    note: Option<String>,
}

impl IssueDetails {
    /// Creates issue details with a quantity of one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyIssueItem`] if the item is blank.
    pub fn new(
        kind: IssueType,
        item: impl Into<String>,
        fault_source: FaultSource,
    ) -> Result<Self, TaskDomainError> {
        let raw_item = item.into();
        let normalized_item = raw_item.trim();
        if normalized_item.is_empty() {
            return Err(TaskDomainError::EmptyIssueItem);
        }

        Ok(Self {
            kind,
            item: normalized_item.to_owned(),
            quantity: 1,
            fault_source,
            responsible_person_id: None,
            photo_url: None,
            note: None,
        })
    }

    /// Sets the affected quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ZeroQuantity`] when `quantity` is zero.
    pub fn with_quantity(mut self, quantity: u32) -> Result<Self, TaskDomainError> {
        if quantity == 0 {
            return Err(TaskDomainError::ZeroQuantity);
        }
        self.quantity = quantity;
        Ok(self)
    }

    /// Sets the person held responsible.
    #[must_use]
    pub fn with_responsible_person(mut self, person_id: PersonId) -> Self {
        self.responsible_person_id = Some(person_id);
        self
    }

    /// Sets a photo reference documenting the defect.
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        let value: String = photo_url.into();
        self.photo_url = non_blank(&value);
        self
    }

    /// Sets a free-text note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let value: String = note.into();
        self.note = non_blank(&value);
        self
    }

    /// Returns the issue type.
    #[must_use]
    pub const fn kind(&self) -> IssueType {
        self.kind
    }

    /// Returns the affected item.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Returns the affected quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let normalized = value.trim();
    (!normalized.is_empty()).then(|| normalized.to_owned())
}

/// Defect reported against a task.
///
/// Apart from its status, resolution time, and replacement progress, an
/// issue never changes after it is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: IssueId,
    #[serde(rename = "type")]
    kind: IssueType,
    item: String,
    quantity: u32,
    fault_source: FaultSource,
    responsible_person_id: Option<PersonId>,
    photo_url: Option<String>,
    note: Option<String>,
    status: IssueStatus,
    replacement: Option<ReplacementState>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Opens a new pending issue.
    #[must_use]
    pub fn open(
        details: IssueDetails,
        replacement: Option<ReplacementState>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: IssueId::new(),
            kind: details.kind,
            item: details.item,
            quantity: details.quantity,
            fault_source: details.fault_source,
            responsible_person_id: details.responsible_person_id,
            photo_url: details.photo_url,
            note: details.note,
            status: IssueStatus::Pending,
            replacement,
            created_at: clock.utc(),
            resolved_at: None,
        }
    }

    /// Returns the issue identifier.
    #[must_use]
    pub const fn id(&self) -> IssueId {
        self.id
    }

    /// Returns the issue type.
    #[must_use]
    pub const fn kind(&self) -> IssueType {
        self.kind
    }

    /// Returns the affected item.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Returns the affected quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the fault attribution.
    #[must_use]
    pub const fn fault_source(&self) -> FaultSource {
        self.fault_source
    }

    /// Returns the person held responsible, if any.
    #[must_use]
    pub const fn responsible_person_id(&self) -> Option<&PersonId> {
        self.responsible_person_id.as_ref()
    }

    /// Returns the photo reference, if any.
    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    /// Returns the note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the resolution status.
    #[must_use]
    pub const fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns `true` while the issue blocks completion.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, IssueStatus::Pending)
    }

    /// Returns the replacement progress, if a replacement was requested.
    #[must_use]
    pub const fn replacement(&self) -> Option<&ReplacementState> {
        self.replacement.as_ref()
    }

    /// Returns the replacement order identifier once the order exists.
    #[must_use]
    pub const fn replacement_order_id(&self) -> Option<&ReplacementOrderId> {
        match &self.replacement {
            Some(ReplacementState::Ordered { order_id, .. }) => Some(order_id),
            Some(ReplacementState::Queued { .. }) | None => None,
        }
    }

    /// Returns the report timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the resolution timestamp, if resolved.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub(super) fn resolve(&mut self, resolved_at: DateTime<Utc>) {
        self.status = IssueStatus::Resolved;
        self.resolved_at = Some(resolved_at);
    }

    /// Records the created order. Returns `false` when no replacement was
    /// queued for this issue.
    pub(super) fn record_replacement_order(&mut self, order_id: ReplacementOrderId) -> bool {
        let Some(ReplacementState::Queued { supplier_id }) = &self.replacement else {
            return false;
        };
        self.replacement = Some(ReplacementState::Ordered {
            supplier_id: supplier_id.clone(),
            order_id,
        });
        true
    }
}
