//! Weekly summary result handed to the presentation layer.

use crate::domain::forecast::ProjectCompletionForecast;
use crate::domain::kpi::DashboardKpiCard;
use serde::Serialize;

pub const LOADING_MESSAGE: &str = "Loading weekly dashboard...";
pub const EMPTY_MESSAGE: &str = "No study sessions yet this week.";
pub const ERROR_MESSAGE: &str = "Could not load weekly dashboard.";

/// Exactly one state is active per summary.
///
/// `forecast` is `None` when the task store could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WeeklySummaryResult {
    Loading {
        message: String,
    },
    Empty {
        message: String,
        forecast: Option<ProjectCompletionForecast>,
    },
    Content {
        cards: Vec<DashboardKpiCard>,
        forecast: Option<ProjectCompletionForecast>,
    },
    Error {
        message: String,
    },
}

impl WeeklySummaryResult {
    pub fn loading(message: impl Into<String>) -> Self {
        Self::Loading {
            message: message.into(),
        }
    }

    pub fn empty(message: impl Into<String>, forecast: Option<ProjectCompletionForecast>) -> Self {
        Self::Empty {
            message: message.into(),
            forecast,
        }
    }

    pub fn content(
        cards: Vec<DashboardKpiCard>,
        forecast: Option<ProjectCompletionForecast>,
    ) -> Self {
        Self::Content { cards, forecast }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Cards to render; empty for every state but `Content`.
    pub fn cards(&self) -> &[DashboardKpiCard] {
        match self {
            Self::Content { cards, .. } => cards,
            _ => &[],
        }
    }

    pub fn forecast(&self) -> Option<&ProjectCompletionForecast> {
        match self {
            Self::Empty { forecast, .. } | Self::Content { forecast, .. } => forecast.as_ref(),
            Self::Loading { .. } | Self::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Loading { message } | Self::Empty { message, .. } | Self::Error { message } => {
                Some(message.as_str())
            }
            Self::Content { .. } => None,
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Loading { .. } => "loading",
            Self::Empty { .. } => "empty",
            Self::Content { .. } => "content",
            Self::Error { .. } => "error",
        }
    }
}
