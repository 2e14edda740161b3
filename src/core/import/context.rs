//! Import context
//!
//! Record fields that neither the document nor the collaborators supply.

use crate::domain::{ReturnUser, UserType};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Caller-supplied values copied onto every record of an import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportContext {
    /// Date the document was received, if known
    pub received_date: Option<NaiveDate>,

    /// User the returns are submitted on behalf of
    pub user: ReturnUser,

    pub version_number: u32,
    pub is_current: bool,
    pub is_under_query: bool,

    /// Free-form metadata, `{}` by default
    pub metadata: Value,
}

impl ImportContext {
    /// Create a context for `user` with default record flags
    pub fn new(user: ReturnUser) -> Self {
        Self {
            received_date: None,
            user,
            version_number: 1,
            is_current: true,
            is_under_query: false,
            metadata: json!({}),
        }
    }

    /// Set the received date
    pub fn with_received_date(mut self, received_date: NaiveDate) -> Self {
        self.received_date = Some(received_date);
        self
    }

    /// Set the metadata
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Create a context from user details as they appear in configuration
    pub fn for_user(
        email: impl Into<String>,
        user_type: UserType,
        entity_id: impl Into<String>,
    ) -> Self {
        Self::new(ReturnUser {
            email: email.into(),
            user_type,
            entity_id: entity_id.into(),
        })
    }
}
