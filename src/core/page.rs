//! Framework-free description of the migrator page.
//!
//! [`render_page`] turns a loaded [`PageState`] into a [`ViewModel`]; the host
//! application decides how to draw it and how to route its actions.

use crate::domain::model::{Feed, Form, FormId, ImportOutcome, WEBHOOKS_ADDON_SLUG};
use crate::utils::error::MigratorError;
use serde::Serialize;

pub const PAGE_SLUG: &str = "gf-advanced-feed-migrator";
pub const PAGE_TITLE: &str = "Gravity Forms - Advanced Feed Migrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn from_error(error: &MigratorError) -> Self {
        Self::error(error.user_friendly_message())
    }

    pub fn imported(outcome: &ImportOutcome) -> Self {
        Self {
            level: NoticeLevel::Updated,
            message: format!(
                "Successfully imported feed into Form ID {}. New feed ID: {}",
                outcome.form_id, outcome.feed_id
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageState {
    pub forms: Vec<Form>,
    pub selected_form: Option<FormId>,
    pub feeds: Vec<Feed>,
    pub kind_only: bool,
    pub kind_filter: String,
    pub notice: Option<Notice>,
}

impl PageState {
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: u64,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterToggle {
    pub label: String,
    pub query: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSection {
    pub form_id: FormId,
    pub feeds: Vec<SelectOption>,
    pub filter_toggle: FilterToggle,
    pub empty_notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub title: String,
    pub forms: Vec<SelectOption>,
    pub export: Option<ExportSection>,
    pub import_destinations: Vec<SelectOption>,
    pub notice: Option<Notice>,
}

pub fn render_page(state: &PageState) -> ViewModel {
    let forms = state
        .forms
        .iter()
        .map(|form| SelectOption {
            value: form.id,
            label: form.label(),
            selected: state.selected_form == Some(form.id),
        })
        .collect();

    let export = state.selected_form.map(|form_id| {
        let feeds: Vec<SelectOption> = state
            .feeds
            .iter()
            .map(|feed| SelectOption {
                value: feed.id(),
                label: feed.label(),
                selected: false,
            })
            .collect();

        let empty_notice = feeds
            .is_empty()
            .then(|| Notice::warning(format!("No feeds found for Form ID {}.", form_id)));

        ExportSection {
            form_id,
            feeds,
            filter_toggle: filter_toggle(form_id, state.kind_only, &state.kind_filter),
            empty_notice,
        }
    });

    let import_destinations = state
        .forms
        .iter()
        .map(|form| SelectOption {
            value: form.id,
            label: form.label(),
            selected: false,
        })
        .collect();

    ViewModel {
        title: PAGE_TITLE.to_string(),
        forms,
        export,
        import_destinations,
        notice: state.notice.clone(),
    }
}

// 切換 "只顯示某類 feed" 的連結參數
fn filter_toggle(form_id: FormId, kind_only: bool, kind_filter: &str) -> FilterToggle {
    let label = if kind_only {
        "Show All Feeds".to_string()
    } else {
        format!("Show Only {} Feeds", kind_label(kind_filter))
    };

    FilterToggle {
        label,
        query: vec![
            ("page".to_string(), PAGE_SLUG.to_string()),
            (
                "kind_only".to_string(),
                if kind_only { "0" } else { "1" }.to_string(),
            ),
            ("form_id".to_string(), form_id.to_string()),
        ],
    }
}

fn kind_label(kind_filter: &str) -> &str {
    if kind_filter == WEBHOOKS_ADDON_SLUG {
        "Webhook"
    } else {
        kind_filter
    }
}
