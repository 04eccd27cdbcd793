//! Implements InputPort. Inquire prompt for the user, crossterm rendering of
//! the weekly summary.

use crate::adapters::ui::progress::LoadingSpinner;
use crate::domain::summary::LOADING_MESSAGE;
use crate::domain::{DomainError, ProjectCompletionForecast, Trend, WeeklySummaryResult};
use crate::ports::InputPort;
use crate::usecases::WeeklySummaryService;
use async_trait::async_trait;
use chrono::TimeZone;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use inquire::CustomType;
use inquire::ui::{Color as PromptColor, RenderConfig, Styled};
use std::fmt;
use std::io::{Write, stdout};
use std::sync::Arc;

/// Tone of a rendered line; mapped to a terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Bad,
    Muted,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Good => Some(Color::Green),
            Tone::Bad => Some(Color::Red),
            Tone::Muted => Some(Color::DarkGrey),
        }
    }
}

fn trend_marker(trend: Trend) -> (&'static str, Tone) {
    match trend {
        Trend::Up => ("↑", Tone::Good),
        Trend::Down => ("↓", Tone::Bad),
        Trend::Neutral => ("→", Tone::Muted),
    }
}

/// Sets the prompt styling used by every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(PromptColor::LightCyan))
        .with_answered_prompt_prefix(Styled::new("✓").with_fg(PromptColor::LightGreen));
    inquire::set_global_render_config(config);
}

fn forecast_lines(forecast: Option<&ProjectCompletionForecast>) -> Vec<(String, Tone)> {
    let Some(f) = forecast else {
        return vec![("Forecast unavailable".to_string(), Tone::Muted)];
    };
    let mut lines = vec![
        (format!("Completion:       {}", f.completion_percent_text), Tone::Plain),
        (format!("Estimated finish: {}", f.estimated_completion_text), Tone::Plain),
    ];
    if f.at_risk {
        lines.push((
            "At risk: projected finish is after the nearest open deadline".to_string(),
            Tone::Bad,
        ));
    }
    lines
}

/// Text lines for a summary, one per card or message, then the forecast.
pub fn summary_lines(result: &WeeklySummaryResult) -> Vec<(String, Tone)> {
    let mut lines = Vec::new();
    match result {
        WeeklySummaryResult::Loading { message } => lines.push((message.clone(), Tone::Muted)),
        WeeklySummaryResult::Error { message } => lines.push((message.clone(), Tone::Bad)),
        WeeklySummaryResult::Empty { message, forecast } => {
            lines.push((message.clone(), Tone::Muted));
            lines.push((String::new(), Tone::Plain));
            lines.extend(forecast_lines(forecast.as_ref()));
        }
        WeeklySummaryResult::Content { cards, forecast } => {
            for card in cards {
                let (marker, tone) = trend_marker(card.trend);
                lines.push((
                    format!(
                        "{:<22} {:>10}  {} {}",
                        card.label, card.value, marker, card.delta_text
                    ),
                    tone,
                ));
            }
            lines.push((String::new(), Tone::Plain));
            lines.extend(forecast_lines(forecast.as_ref()));
        }
    }
    lines
}

fn print_lines(lines: &[(String, Tone)]) {
    let mut out = stdout();
    for (text, tone) in lines {
        if let Some(color) = tone.color() {
            let _ = out.execute(SetForegroundColor(color));
        }
        let _ = out.execute(Print(format!("  {}\r\n", text)));
        let _ = out.execute(ResetColor);
    }
    let _ = out.flush();
}

/// TUI adapter. Prompts for the user (unless preset) and prints the dashboard.
pub struct TuiInputPort<Tz: TimeZone> {
    service: Arc<WeeklySummaryService<Tz>>,
    user_id: Option<i64>,
}

impl<Tz: TimeZone> TuiInputPort<Tz> {
    pub fn new(service: Arc<WeeklySummaryService<Tz>>, user_id: Option<i64>) -> Self {
        Self { service, user_id }
    }

    fn resolve_user_id(&self) -> Result<i64, DomainError> {
        if let Some(id) = self.user_id {
            return Ok(id);
        }
        CustomType::<i64>::new("User id:")
            .with_error_message("Enter a numeric user id")
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))
    }
}

#[async_trait]
impl<Tz> InputPort for TuiInputPort<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: fmt::Display + Send + Sync,
{
    async fn run(&self) -> Result<(), DomainError> {
        let user_id = self.resolve_user_id()?;

        let loading = WeeklySummaryResult::loading(LOADING_MESSAGE);
        let spinner = LoadingSpinner::start(loading.message().unwrap_or(LOADING_MESSAGE));
        let result = self.service.load_weekly_summary(user_id).await;
        spinner.finish();

        print_lines(&summary_lines(&result));
        Ok(())
    }
}
