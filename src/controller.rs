use crate::api::DiaryApi;
use crate::cache::{DiaryCache, DiaryQuery};
use crate::dates::{ReferenceZone, date_key, format_date, parse_date, shift_date};
use crate::errors::ControllerError;
use crate::models::{CreateDiaryRequest, DiaryRecord, FormState, UpdateDiaryRequest};
use crate::navigate::Navigator;
use crate::notify::Notifier;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SAVING_MESSAGE: &str = "Saving...";
pub const SAVED_MESSAGE: &str = "Saved!";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save the diary.";
pub const DELETING_MESSAGE: &str = "Deleting...";
pub const DELETED_MESSAGE: &str = "Diary deleted.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete the diary.";
pub const DELETE_PROMPT: &str = "Delete the diary for this date?";
pub const FUTURE_DATE_MESSAGE: &str = "You cannot write a diary for a future date.";
pub const INVALID_DATE_MESSAGE: &str = "Please pick a valid date.";
pub const NOT_FOUND_MESSAGE: &str = "No diary entry exists for this date.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load the diary.";

pub const DEFAULT_LIST_PATH: &str = "/diaries";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct FormOptions {
    pub zone: ReferenceZone,
    pub list_path: String,
    pub initial_date: Option<String>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            zone: ReferenceZone::default(),
            list_path: DEFAULT_LIST_PATH.to_string(),
            initial_date: None,
        }
    }
}

/// Form state for the diary of one day, kept in step with the remote record
/// for that day.
///
/// `form().date` is always the key the query fetches with. Whenever the
/// resolved record for that key changes, score and content are overwritten
/// from it (or reset to defaults when there is none).
pub struct DiaryFormController<A> {
    form: FormState,
    query: DiaryQuery<A>,
    zone: ReferenceZone,
    list_path: String,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl<A: DiaryApi> DiaryFormController<A> {
    pub fn new(
        cache: DiaryCache<A>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        options: FormOptions,
    ) -> Self {
        let date = options
            .initial_date
            .unwrap_or_else(|| options.zone.today_string());
        Self {
            query: DiaryQuery::new(cache, date.clone()),
            form: FormState::new(date),
            zone: options.zone,
            list_path: options.list_path,
            notifier,
            navigator,
        }
    }

    /// Builds the controller and resolves the record for its first date.
    pub async fn mount(
        cache: DiaryCache<A>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        options: FormOptions,
    ) -> Self {
        let mut controller = Self::new(cache, notifier, navigator, options);
        controller.sync().await;
        controller
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn record(&self) -> Option<&DiaryRecord> {
        self.query.data()
    }

    pub fn can_delete(&self) -> bool {
        self.record().is_some()
    }

    /// Inline message for a failed fetch of the current date.
    pub fn error_message(&self) -> Option<&'static str> {
        self.query.error().map(|err| {
            if err.status() == Some(404) {
                NOT_FOUND_MESSAGE
            } else {
                LOAD_FAILED_MESSAGE
            }
        })
    }

    /// Re-reads the record for the current date and overwrites score and
    /// content if it changed since last applied.
    pub async fn sync(&mut self) {
        if self.query.resolve().await {
            self.apply_record();
        }
    }

    pub async fn change_date(&mut self, delta_days: i64) -> Result<(), ControllerError> {
        let Some(next) = shift_date(&self.form.date, delta_days) else {
            warn!(date = %self.form.date, delta_days, "cannot step an unparseable date");
            return Err(ControllerError::InvalidDate(self.form.date.clone()));
        };
        self.set_date(next).await;
        Ok(())
    }

    pub async fn set_date(&mut self, date: impl Into<String>) {
        let date = date.into();
        self.query.set_key(date.clone());
        self.form.date = date;
        self.sync().await;
    }

    pub fn set_mental_score(&mut self, score: i32) {
        self.form.mental_score = score;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.form.content = content.into();
    }

    /// Creates or updates the record for the current date.
    ///
    /// Future or unparseable dates are turned away before any request. On
    /// failure the form is left as is so the user can retry.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ControllerError> {
        let Some(date) = parse_date(&self.form.date) else {
            self.notifier.error(None, INVALID_DATE_MESSAGE);
            return Err(ControllerError::InvalidDate(self.form.date.clone()));
        };
        if date > self.zone.today() {
            self.notifier.error(None, FUTURE_DATE_MESSAGE);
            return Err(ControllerError::FutureDate);
        }

        let normalized = format_date(&self.form.date).unwrap_or_else(|| date_key(date));
        let exists = self.record().is_some();
        let toast = self.notifier.loading(SAVING_MESSAGE);

        let api = self.query.cache().api();
        let result = if exists {
            let body = UpdateDiaryRequest {
                mental: self.form.mental_score,
                diary: self.form.content.clone(),
            };
            api.update_diary(&normalized, &body)
                .await
                .map(|_| SubmitOutcome::Updated)
        } else {
            let body = CreateDiaryRequest {
                date: normalized.clone(),
                mental: self.form.mental_score,
                diary: self.form.content.clone(),
            };
            api.create_diary(&body).await.map(|_| SubmitOutcome::Created)
        };

        match result {
            Ok(outcome) => {
                info!(date = %normalized, ?outcome, "diary saved");
                self.notifier.success(Some(toast), SAVED_MESSAGE);
                self.invalidate(&normalized).await;
                self.sync().await;
                self.navigator.navigate(&self.list_path);
                Ok(outcome)
            }
            Err(err) => {
                error!(date = %normalized, "failed to save diary: {err}");
                self.notifier.error(Some(toast), SAVE_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }

    /// Deletes the record for the current date once `confirm` agrees.
    pub async fn delete_diary(
        &mut self,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<(), ControllerError> {
        if !self.can_delete() {
            return Err(ControllerError::NoRecord);
        }
        if !confirm(DELETE_PROMPT) {
            info!(date = %self.form.date, "delete cancelled");
            return Err(ControllerError::Cancelled);
        }

        let normalized = format_date(&self.form.date).unwrap_or_else(|| self.form.date.clone());
        let toast = self.notifier.loading(DELETING_MESSAGE);

        let result = self.query.cache().api().delete_diary(&normalized).await;
        match result {
            Ok(response) => {
                info!(date = %normalized, message = %response.message, "diary deleted");
                if normalized != self.form.date {
                    self.query.cache().invalidate(&normalized).await;
                }
                self.query.revalidate().await;
                self.form.reset_fields();
                self.notifier.success(Some(toast), DELETED_MESSAGE);
                self.navigator.navigate(&self.list_path);
                Ok(())
            }
            Err(err) => {
                error!(date = %normalized, "failed to delete diary: {err}");
                self.notifier.error(Some(toast), DELETE_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }

    async fn invalidate(&self, normalized: &str) {
        let cache = self.query.cache();
        cache.invalidate(&self.form.date).await;
        if normalized != self.form.date {
            cache.invalidate(normalized).await;
        }
    }

    fn apply_record(&mut self) {
        match self.query.data() {
            Some(record) => self.form.mirror(record),
            None => self.form.reset_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, MemoryDiaryApi};
    use crate::errors::ApiError;
    use crate::models::DEFAULT_MENTAL_SCORE;
    use crate::notify::{ToastKind, ToastLog};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator(Mutex<Vec<String>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.0.lock().unwrap().push(path.to_string());
        }
    }

    impl RecordingNavigator {
        fn visits(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Harness {
        controller: DiaryFormController<MemoryDiaryApi>,
        api: Arc<MemoryDiaryApi>,
        toasts: ToastLog,
        navigator: Arc<RecordingNavigator>,
    }

    async fn mount(api: MemoryDiaryApi, date: Option<&str>) -> Harness {
        let api = Arc::new(api);
        let toasts = ToastLog::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let options = FormOptions {
            initial_date: date.map(str::to_string),
            ..FormOptions::default()
        };
        let controller = DiaryFormController::mount(
            DiaryCache::new(Arc::clone(&api)),
            Arc::new(toasts.clone()),
            navigator.clone(),
            options,
        )
        .await;
        Harness {
            controller,
            api,
            toasts,
            navigator,
        }
    }

    #[tokio::test]
    async fn defaults_to_today_in_reference_zone() {
        let h = mount(MemoryDiaryApi::default(), None).await;
        assert_eq!(h.controller.form().date, ReferenceZone::default().today_string());
        assert_eq!(h.controller.form().mental_score, DEFAULT_MENTAL_SCORE);
        assert_eq!(h.controller.form().content, "");
        assert!(!h.controller.can_delete());
    }

    #[tokio::test]
    async fn mounting_mirrors_existing_record() {
        let h = mount(
            MemoryDiaryApi::with_record("2024-01-10", 8, "sunny"),
            Some("2024-01-10"),
        )
        .await;
        assert_eq!(h.controller.form().mental_score, 8);
        assert_eq!(h.controller.form().content, "sunny");
        assert!(h.controller.can_delete());
        assert_eq!(h.api.calls(), vec![Call::Get("2024-01-10".into())]);
    }

    #[tokio::test]
    async fn submit_without_record_creates_with_date_in_body() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2024-01-10")).await;
        h.controller.set_content("felt ok");
        h.controller.set_mental_score(7);

        let outcome = h.controller.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(
            h.api.writes(),
            vec![Call::Create(CreateDiaryRequest {
                date: "2024-01-10".into(),
                mental: 7,
                diary: "felt ok".into(),
            })]
        );
        assert_eq!(h.navigator.visits(), vec![DEFAULT_LIST_PATH.to_string()]);
        assert!(h.controller.can_delete());

        let toasts = h.toasts.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[0].message, SAVED_MESSAGE);
    }

    #[tokio::test]
    async fn submit_with_record_updates_without_date_in_body() {
        let mut h = mount(
            MemoryDiaryApi::with_record("2024-01-10", 4, "meh"),
            Some("2024-01-10"),
        )
        .await;
        h.controller.set_mental_score(6);
        h.controller.set_content("better");

        let outcome = h.controller.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated);
        assert_eq!(
            h.api.writes(),
            vec![Call::Update(
                "2024-01-10".into(),
                UpdateDiaryRequest {
                    mental: 6,
                    diary: "better".into(),
                }
            )]
        );
        // the refetch after saving went back to the api
        assert_eq!(
            h.api.calls().last(),
            Some(&Call::Get("2024-01-10".into()))
        );
        assert_eq!(h.controller.form().mental_score, 6);
        assert_eq!(h.navigator.visits().len(), 1);
    }

    #[tokio::test]
    async fn submit_normalizes_loose_dates() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2024/1/10")).await;
        h.controller.set_mental_score(2);
        h.controller.submit().await.unwrap();
        assert_eq!(
            h.api.writes(),
            vec![Call::Create(CreateDiaryRequest {
                date: "2024-01-10".into(),
                mental: 2,
                diary: String::new(),
            })]
        );
        assert_eq!(h.controller.form().date, "2024/1/10");
    }

    #[tokio::test]
    async fn future_dates_never_reach_the_network() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2999-01-01")).await;
        let calls_before = h.api.calls().len();
        h.controller.set_content("from the future");

        let err = h.controller.submit().await.unwrap_err();
        assert_eq!(err, ControllerError::FutureDate);
        assert_eq!(h.api.calls().len(), calls_before);
        assert!(h.navigator.visits().is_empty());
        assert_eq!(h.controller.form().content, "from the future");

        let toasts = h.toasts.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message, FUTURE_DATE_MESSAGE);
    }

    #[tokio::test]
    async fn tomorrow_is_already_the_future() {
        let mut h = mount(MemoryDiaryApi::default(), None).await;
        h.controller.change_date(1).await.unwrap();
        assert_eq!(
            h.controller.submit().await.unwrap_err(),
            ControllerError::FutureDate
        );
        assert!(h.api.writes().is_empty());
    }

    #[tokio::test]
    async fn unparseable_dates_are_rejected_before_submit() {
        let mut h = mount(MemoryDiaryApi::default(), Some("someday")).await;
        let err = h.controller.submit().await.unwrap_err();
        assert!(matches!(err, ControllerError::InvalidDate(_)));
        assert!(h.api.writes().is_empty());
        assert_eq!(h.toasts.drain()[0].message, INVALID_DATE_MESSAGE);

        assert!(h.controller.change_date(1).await.is_err());
        assert_eq!(h.controller.form().date, "someday");
    }

    #[tokio::test]
    async fn failed_write_keeps_the_form_for_retry() {
        let api = MemoryDiaryApi::default();
        *api.fail_writes.lock().unwrap() = Some(ApiError::Rejected("quota".into()));
        let mut h = mount(api, Some("2024-01-10")).await;
        h.controller.set_mental_score(9);
        h.controller.set_content("draft");

        let err = h.controller.submit().await.unwrap_err();
        assert_eq!(err, ControllerError::Api(ApiError::Rejected("quota".into())));
        assert_eq!(h.controller.form().mental_score, 9);
        assert_eq!(h.controller.form().content, "draft");
        assert!(h.navigator.visits().is_empty());

        let toasts = h.toasts.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert_eq!(toasts[0].message, SAVE_FAILED_MESSAGE);

        *h.api.fail_writes.lock().unwrap() = None;
        assert_eq!(h.controller.submit().await.unwrap(), SubmitOutcome::Created);
    }

    #[tokio::test]
    async fn stepping_dates_round_trips_and_refetches() {
        let api = MemoryDiaryApi::with_record("2024-01-09", 3, "rainy");
        let mut h = mount(api, Some("2024-01-10")).await;

        h.controller.set_content("unsaved");
        h.controller.change_date(-1).await.unwrap();
        assert_eq!(h.controller.form().date, "2024-01-09");
        assert_eq!(h.controller.form().mental_score, 3);
        assert_eq!(h.controller.form().content, "rainy");

        h.controller.change_date(1).await.unwrap();
        assert_eq!(h.controller.form().date, "2024-01-10");
        assert_eq!(h.controller.form().mental_score, DEFAULT_MENTAL_SCORE);
        assert_eq!(h.controller.form().content, "");
        assert_eq!(
            h.api.calls(),
            vec![
                Call::Get("2024-01-10".into()),
                Call::Get("2024-01-09".into()),
                Call::Get("2024-01-10".into()),
            ]
        );
    }

    #[tokio::test]
    async fn coming_back_to_a_date_sees_records_written_meanwhile() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2024-01-10")).await;
        h.controller.change_date(-1).await.unwrap();
        h.api.insert("2024-01-10", 9, "from another tab");

        h.controller.change_date(1).await.unwrap();
        assert_eq!(h.controller.form().mental_score, 9);
        assert_eq!(h.controller.form().content, "from another tab");
        assert!(h.controller.can_delete());

        h.controller.set_content("edited");
        assert_eq!(h.controller.submit().await.unwrap(), SubmitOutcome::Updated);
        assert_eq!(
            h.api.writes(),
            vec![Call::Update(
                "2024-01-10".into(),
                UpdateDiaryRequest {
                    mental: 9,
                    diary: "edited".into(),
                }
            )]
        );
    }

    #[tokio::test]
    async fn set_date_takes_any_string() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2024-01-10")).await;
        h.controller.set_date("whenever").await;
        assert_eq!(h.controller.form().date, "whenever");
        assert_eq!(h.api.calls().last(), Some(&Call::Get("whenever".into())));
    }

    #[tokio::test]
    async fn delete_resets_fields_and_keeps_date() {
        let mut h = mount(
            MemoryDiaryApi::with_record("2024-01-10", 2, "rough day"),
            Some("2024-01-10"),
        )
        .await;
        let mut prompt = String::new();

        h.controller
            .delete_diary(|message| {
                prompt = message.to_string();
                true
            })
            .await
            .unwrap();

        assert_eq!(prompt, DELETE_PROMPT);
        assert_eq!(h.api.writes(), vec![Call::Delete("2024-01-10".into())]);
        assert_eq!(h.controller.form().date, "2024-01-10");
        assert_eq!(h.controller.form().mental_score, DEFAULT_MENTAL_SCORE);
        assert_eq!(h.controller.form().content, "");
        assert!(!h.controller.can_delete());
        assert_eq!(h.navigator.visits(), vec![DEFAULT_LIST_PATH.to_string()]);
        assert_eq!(h.toasts.drain()[0].message, DELETED_MESSAGE);
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let mut h = mount(
            MemoryDiaryApi::with_record("2024-01-10", 2, "rough day"),
            Some("2024-01-10"),
        )
        .await;
        let err = h.controller.delete_diary(|_| false).await.unwrap_err();
        assert_eq!(err, ControllerError::Cancelled);
        assert!(h.api.writes().is_empty());
        assert_eq!(h.controller.form().content, "rough day");
    }

    #[tokio::test]
    async fn delete_requires_an_existing_record() {
        let mut h = mount(MemoryDiaryApi::default(), Some("2024-01-10")).await;
        let mut asked = false;
        let err = h
            .controller
            .delete_diary(|_| {
                asked = true;
                true
            })
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::NoRecord);
        assert!(!asked);
        assert!(h.api.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_leaves_form_alone() {
        let api = MemoryDiaryApi::with_record("2024-01-10", 2, "rough day");
        let mut h = mount(api, Some("2024-01-10")).await;
        *h.api.fail_writes.lock().unwrap() = Some(ApiError::Transport("offline".into()));

        assert!(h.controller.delete_diary(|_| true).await.is_err());
        assert_eq!(h.controller.form().mental_score, 2);
        assert!(h.controller.can_delete());
        assert!(h.navigator.visits().is_empty());
        assert_eq!(h.toasts.drain()[0].message, DELETE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn error_message_tells_missing_from_failed() {
        let api = MemoryDiaryApi::default();
        *api.fail_reads.lock().unwrap() = Some(ApiError::NotFound);
        let mut h = mount(api, Some("2024-01-10")).await;
        assert_eq!(h.controller.error_message(), Some(NOT_FOUND_MESSAGE));
        assert!(!h.controller.can_delete());

        *h.api.fail_reads.lock().unwrap() = Some(ApiError::Status {
            status: 500,
            message: "boom".into(),
        });
        h.controller.change_date(-1).await.unwrap();
        assert_eq!(h.controller.error_message(), Some(LOAD_FAILED_MESSAGE));

        *h.api.fail_reads.lock().unwrap() = None;
        h.controller.change_date(-1).await.unwrap();
        assert_eq!(h.controller.error_message(), None);
        // load errors are for inline display only
        assert!(h.toasts.pending().is_empty());
    }
}
