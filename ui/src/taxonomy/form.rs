//! Class category drawer form: draft validation and the open/submit/close lifecycle.

use api::categories::{ClassCategory, ClassCategoryInput};

pub const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be at most {TITLE_MAX_CHARS} characters (got {0})")]
    TitleTooLong(usize),

    #[error("Color must look like #RRGGBB (got {0:?})")]
    InvalidColor(String),
}

impl DraftError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            DraftError::TitleRequired | DraftError::TitleTooLong(_) => "title",
            DraftError::InvalidColor(_) => "color",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassCategoryDraft {
    pub title: String,
    pub description: String,
    pub color: String,
}

impl ClassCategoryDraft {
    pub fn from_category(category: &ClassCategory) -> Self {
        Self {
            title: category.title.clone(),
            description: category.description.clone().unwrap_or_default(),
            color: category.color.clone().unwrap_or_default(),
        }
    }

    /// Every problem with the draft; empty when it can be saved.
    pub fn validate(&self) -> Vec<DraftError> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(DraftError::TitleRequired);
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(DraftError::TitleTooLong(title.chars().count()));
        }

        let color = self.color.trim();
        if !color.is_empty() && !is_hex_color(color) {
            errors.push(DraftError::InvalidColor(color.to_string()));
        }

        errors
    }

    /// Request body with trimmed values; blank optionals are omitted.
    pub fn to_input(&self) -> ClassCategoryInput {
        let optional = |raw: &str| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        ClassCategoryInput {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            color: optional(&self.color).map(|c| c.to_ascii_uppercase()),
        }
    }
}

fn is_hex_color(raw: &str) -> bool {
    raw.len() == 7
        && raw.starts_with('#')
        && raw[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// What the drawer is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the drawer stays open showing the errors.
    Blocked(Vec<DraftError>),
    /// Hand this to the save callback. Issued at most once per open.
    Saved {
        mode: DrawerMode,
        input: ClassCategoryInput,
    },
    /// Closed, or a save is already in flight.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed,
    Editing,
    Saving,
}

/// Drawer lifecycle. `submit` yields [`SubmitOutcome::Saved`] once per
/// [`DrawerForm::open_create`] / [`DrawerForm::open_edit`]; a failed save re-arms it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawerForm {
    phase: Phase,
    mode: DrawerMode,
    pub draft: ClassCategoryDraft,
    errors: Vec<DraftError>,
    save_error: Option<String>,
}

impl Default for DrawerForm {
    fn default() -> Self {
        Self {
            phase: Phase::Closed,
            mode: DrawerMode::Create,
            draft: ClassCategoryDraft::default(),
            errors: Vec::new(),
            save_error: None,
        }
    }
}

impl DrawerForm {
    pub fn open_create(&mut self) {
        self.reopen(DrawerMode::Create, ClassCategoryDraft::default());
    }

    pub fn open_edit(&mut self, category: &ClassCategory) {
        self.reopen(
            DrawerMode::Edit {
                id: category.id.clone(),
            },
            ClassCategoryDraft::from_category(category),
        );
    }

    fn reopen(&mut self, mode: DrawerMode, draft: ClassCategoryDraft) {
        *self = Self {
            phase: Phase::Editing,
            mode,
            draft,
            errors: Vec::new(),
            save_error: None,
        };
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn is_saving(&self) -> bool {
        self.phase == Phase::Saving
    }

    pub fn mode(&self) -> &DrawerMode {
        &self.mode
    }

    pub fn errors(&self) -> &[DraftError] {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&DraftError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if self.phase != Phase::Editing {
            tracing::debug!(phase = ?self.phase, "drawer submit ignored");
            return SubmitOutcome::Ignored;
        }
        let errors = self.draft.validate();
        if !errors.is_empty() {
            tracing::info!(errors = errors.len(), "class category draft blocked");
            self.errors = errors.clone();
            return SubmitOutcome::Blocked(errors);
        }
        self.errors.clear();
        self.save_error = None;
        self.phase = Phase::Saving;
        SubmitOutcome::Saved {
            mode: self.mode.clone(),
            input: self.draft.to_input(),
        }
    }

    /// The save request failed; keep the drawer open so the user can retry.
    pub fn save_failed(&mut self, message: impl Into<String>) {
        if self.phase == Phase::Saving {
            self.phase = Phase::Editing;
            self.save_error = Some(message.into());
        }
    }

    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }
}
