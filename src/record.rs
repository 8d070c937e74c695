use std::fmt;

use serde::Serialize;

/// One extracted business. Only the name is mandatory; every other field
/// defaults to an empty string when the markup lacks it.
///
/// Serialized column names match the spreadsheet layout operators already
/// consume downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Business Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Google Maps Link")]
    pub source_link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Success,
    #[serde(rename = "No Data")]
    NoData,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Success => write!(f, "Success"),
            SessionStatus::NoData => write!(f, "No Data"),
            SessionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// What one keyword's session amounted to.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    #[serde(rename = "Keyword")]
    pub keyword: String,
    #[serde(rename = "Records")]
    pub records: usize,
    #[serde(rename = "Status")]
    pub status: SessionStatus,
}

impl SessionOutcome {
    pub fn completed(keyword: &str, records: usize) -> Self {
        let status = if records > 0 {
            SessionStatus::Success
        } else {
            SessionStatus::NoData
        };
        Self {
            keyword: keyword.to_string(),
            records,
            status,
        }
    }

    pub fn failed(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            records: 0,
            status: SessionStatus::Failed,
        }
    }
}

/// Ordered per-keyword outcomes plus the aggregates derived from them.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sessions: Vec<SessionOutcome>,
}

impl RunSummary {
    pub fn push(&mut self, outcome: SessionOutcome) {
        self.sessions.push(outcome);
    }

    pub fn keywords_processed(&self) -> usize {
        self.sessions.len()
    }

    pub fn successes(&self) -> usize {
        self.sessions
            .iter()
            .filter(|session| session.status == SessionStatus::Success)
            .count()
    }

    pub fn total_records(&self) -> usize {
        self.sessions.iter().map(|session| session.records).sum()
    }
}
