use serde::{Deserialize, Serialize};

use crate::screening::error::ScreeningError;

/// A job opening as submitted for screening. Treated as immutable once a
/// screening request has been composed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// A resume supplied either as pasted text or as the name of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumeInput {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

impl ResumeInput {
    /// The string sent to the scoring service for this resume.
    pub fn as_payload(&self) -> &str {
        match self {
            ResumeInput::Text { text } => text,
            ResumeInput::File { file_name } => file_name,
        }
    }
}

/// Checks the caller-supplied part of a screening request before anything
/// leaves the process.
pub fn validate_request(job: &Job, resumes: &[ResumeInput]) -> Result<(), ScreeningError> {
    if job.id.trim().is_empty() {
        return Err(ScreeningError::validation("job id cannot be empty"));
    }
    if job.title.trim().is_empty() {
        return Err(ScreeningError::validation("job title cannot be empty"));
    }
    if resumes.is_empty() {
        return Err(ScreeningError::validation(
            "at least one resume is required",
        ));
    }
    if let Some(index) = resumes
        .iter()
        .position(|r| r.as_payload().trim().is_empty())
    {
        return Err(ScreeningError::validation(format!(
            "resume #{} is empty",
            index + 1
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub name: String,
    pub level: u8, // 0 – 100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningEntry {
    pub factor: String,
    pub score: u8, // 0 – 100
    pub note: String,
}

/// Display band for a candidate score, as used by the dashboard badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 85 {
            ScoreBand::High
        } else if score >= 70 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

/// A scored candidate. Only the normalizer constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub score: u8,
    pub band: ScoreBand,
    pub skills: Vec<SkillAssessment>,
    pub reasoning: Vec<ReasoningEntry>,
    pub match_reason: String,
}

/// Orders candidates by descending score, then ascending id.
pub fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
}
