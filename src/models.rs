use crate::notify::Toast;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MENTAL_SCORE: i32 = 5;

/// One diary entry as the remote API stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryRecord {
    pub date: String,
    pub mental: i32,
    pub diary: String,
}

#[derive(Debug, Deserialize)]
pub struct GetDiaryResponse {
    #[serde(default)]
    pub data: Option<DiaryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDiaryRequest {
    pub date: String,
    pub mental: i32,
    pub diary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDiaryRequest {
    pub mental: i32,
    pub diary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDiaryResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub date: String,
    pub mental_score: i32,
    pub content: String,
}

impl FormState {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            mental_score: DEFAULT_MENTAL_SCORE,
            content: String::new(),
        }
    }

    pub fn reset_fields(&mut self) {
        self.mental_score = DEFAULT_MENTAL_SCORE;
        self.content.clear();
    }

    pub fn mirror(&mut self, record: &DiaryRecord) {
        self.mental_score = record.mental;
        self.content = record.diary.clone();
    }
}

#[derive(Debug, Deserialize)]
pub struct DateForm {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct EntryForm {
    pub mental_score: i32,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteForm {
    pub fn confirmed(&self) -> bool {
        matches!(self.confirm.as_deref(), Some("on" | "true" | "yes" | "1"))
    }
}

#[derive(Debug, Serialize)]
pub struct FormSnapshotResponse {
    pub form: FormState,
    pub can_delete: bool,
    pub error_message: Option<String>,
    pub toasts: Vec<Toast>,
}
