// src/db/models/requests.rs
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow state shared by every request kind.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, ToSchema)]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApprovalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("must be one of Pending, Approved, Rejected (got `{s}`)"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub pattern_id: String,
    pub pattern_name: String,
    pub material: String,
    pub size: String,
    pub country: String,
    pub date: NaiveDate,
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub material_id: String,
    pub material_name: String,
    #[serde(rename = "type")]
    pub material_type: String,
    pub date: NaiveDate,
    /// Digits only, kept as a string on the wire.
    pub quantity: String,
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub chest: f64,
    pub waist: f64,
    pub hip: f64,
    pub sleeve_length: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SizeChartRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub country: String,
    pub size: String,
    pub measurements: Measurements,
    pub date: NaiveDate,
    pub approval_status: ApprovalStatus,
}
