use axum::{extract::rejection::JsonRejection, extract::State, Json};
use clinical_nlp::{ClinicalNote, SummaryReport, TierCounts, MODEL_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::ApiResult;
use crate::server::AppState;

/// Status reported for every completed case
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Summarization request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "caseId": "case-001",
    "clinicalNotes": "CC: chest pain radiating to left arm. Vital signs: HR 110.",
    "patientAge": "72",
    "gender": "male"
}))]
pub struct SummarizeRequest {
    /// Caller-chosen case identifier, echoed back
    pub case_id: String,
    /// Free-text clinical note
    pub clinical_notes: String,
    /// Age in years; non-numeric values are ignored
    pub patient_age: String,
    pub gender: String,
}

impl From<SummarizeRequest> for ClinicalNote {
    fn from(request: SummarizeRequest) -> Self {
        ClinicalNote::new(
            request.case_id,
            request.clinical_notes,
            request.patient_age,
            request.gender,
        )
    }
}

/// Derived summary text
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub chief_complaint: String,
    pub key_findings: String,
    pub assessment: String,
    pub recommendations: Vec<String>,
    /// Comma-separated ICD-10 codes
    pub icd_codes: String,
}

/// Matches found by each detection tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierCountsBody {
    pub lexical: usize,
    pub normalized: usize,
    pub similarity: usize,
}

impl From<TierCounts> for TierCountsBody {
    fn from(counts: TierCounts) -> Self {
        Self {
            lexical: counts.lexical,
            normalized: counts.normalized,
            similarity: counts.similarity,
        }
    }
}

/// Processing metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    /// RFC 3339 time the case finished
    pub processed_at: String,
    pub model_version: String,
    pub status: String,
    /// Most severe tier among the risk words
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_severity: Option<String>,
    pub severities: Vec<String>,
    pub tier_counts: TierCountsBody,
}

/// Summarization response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub case_id: String,
    pub summary: SummaryBody,
    pub risk_factors: Vec<String>,
    /// Matched risk phrases in sorted order
    pub risk_words: Vec<String>,
    pub confidence_score: u32,
    pub metadata: SummaryMetadata,
}

impl SummarizeResponse {
    pub fn from_report(report: SummaryReport, processed_at: chrono::DateTime<chrono::Utc>) -> Self {
        let metadata = SummaryMetadata {
            processed_at: processed_at.to_rfc3339(),
            model_version: MODEL_VERSION.to_string(),
            status: STATUS_SUCCESS.to_string(),
            highest_severity: report
                .risk_profile
                .highest_severity()
                .map(|severity| severity.as_str().to_string()),
            severities: report
                .risk_profile
                .severities
                .iter()
                .map(|severity| severity.as_str().to_string())
                .collect(),
            tier_counts: report.tier_counts.into(),
        };

        Self {
            case_id: report.case_id,
            summary: SummaryBody {
                chief_complaint: report.summary.chief_complaint,
                key_findings: report.summary.key_findings,
                assessment: report.summary.assessment,
                recommendations: report.summary.recommendations,
                icd_codes: report.summary.icd_codes,
            },
            risk_factors: report.risk_factors,
            risk_words: report.risk_profile.words,
            confidence_score: report.summary.confidence_score,
            metadata,
        }
    }
}

/// Summarize a clinical note
///
/// Classifies risk terms through the detection cascade and derives the chief
/// complaint, key findings, ICD-10 codes, risk factors and a confidence score.
#[utoipa::path(
    post,
    path = "/api/v1/summarize",
    tag = "summarization",
    request_body(
        content = SummarizeRequest,
        description = "Clinical note and patient demographics"
    ),
    responses(
        (status = 200, description = "Case summarized", body = SummarizeResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ApiErrorResponse),
        (status = 422, description = "Missing or mistyped fields", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Failed to summarize case", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn summarize_case(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<Json<SummarizeResponse>> {
    let Json(request) = payload?;

    info!(case_id = %request.case_id, "Summarization request received");
    debug!(
        case_id = %request.case_id,
        note = %state.logger.preview(&request.clinical_notes),
        "Received clinical note"
    );

    let report = state.service.summarize(request.into()).await?;
    let response = SummarizeResponse::from_report(report, chrono::Utc::now());

    info!(
        case_id = %response.case_id,
        risk_words = response.risk_words.len(),
        confidence = response.confidence_score,
        "Summarization response sent"
    );
    Ok(Json(response))
}
