use crate::errors::ApiError;
use crate::models::{
    CreateDiaryRequest, DeleteDiaryResponse, DiaryRecord, GetDiaryResponse, UpdateDiaryRequest,
};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Remote diary REST API.
pub trait DiaryApi: Send + Sync + 'static {
    /// `Ok(None)` means the backend answered without a record for `date`.
    fn get_diary(
        &self,
        date: &str,
    ) -> impl Future<Output = Result<Option<DiaryRecord>, ApiError>> + Send;

    fn create_diary(
        &self,
        body: &CreateDiaryRequest,
    ) -> impl Future<Output = Result<DiaryRecord, ApiError>> + Send;

    fn update_diary(
        &self,
        date: &str,
        body: &UpdateDiaryRequest,
    ) -> impl Future<Output = Result<DiaryRecord, ApiError>> + Send;

    fn delete_diary(
        &self,
        date: &str,
    ) -> impl Future<Output = Result<DeleteDiaryResponse, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpDiaryApi {
    client: Client,
    base_url: Url,
}

impl HttpDiaryApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiError::Transport(format!("invalid base url {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("invalid base url {base_url}")));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn diary_url(&self, date: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("diary");
            if let Some(date) = date {
                segments.push(date);
            }
        }
        url
    }
}

impl DiaryApi for HttpDiaryApi {
    async fn get_diary(&self, date: &str) -> Result<Option<DiaryRecord>, ApiError> {
        let response = self.client.get(self.diary_url(Some(date))).send().await?;
        let body = read_body(response).await?;
        let parsed: GetDiaryResponse =
            serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(parsed.data)
    }

    async fn create_diary(&self, body: &CreateDiaryRequest) -> Result<DiaryRecord, ApiError> {
        info!(date = %body.date, "creating diary");
        let response = self
            .client
            .post(self.diary_url(None))
            .json(body)
            .send()
            .await?;
        record_from(read_body(response).await?)
    }

    async fn update_diary(
        &self,
        date: &str,
        body: &UpdateDiaryRequest,
    ) -> Result<DiaryRecord, ApiError> {
        info!(date, "updating diary");
        let response = self
            .client
            .put(self.diary_url(Some(date)))
            .json(body)
            .send()
            .await?;
        record_from(read_body(response).await?)
    }

    async fn delete_diary(&self, date: &str) -> Result<DeleteDiaryResponse, ApiError> {
        info!(date, "deleting diary");
        let response = self.client.delete(self.diary_url(Some(date))).send().await?;
        let body = read_body(response).await?;
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

async fn read_body(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    let text = response.text().await?;
    if !status.is_success() {
        warn!(status = status.as_u16(), "diary api request failed");
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|value| error_flag(&value))
            .unwrap_or(text);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))?
    };
    if let Some(message) = error_flag(&value) {
        return Err(ApiError::Rejected(message));
    }
    Ok(value)
}

/// A non-null, non-false `error` field marks a failed write even when the
/// status was 2xx.
fn error_flag(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(fields.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn record_from(mut value: Value) -> Result<DiaryRecord, ApiError> {
    if let Some(data) = value.get_mut("data").map(Value::take) {
        value = data;
    }
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Get(String),
        Create(CreateDiaryRequest),
        Update(String, UpdateDiaryRequest),
        Delete(String),
    }

    #[derive(Default)]
    pub struct MemoryDiaryApi {
        pub records: Mutex<BTreeMap<String, DiaryRecord>>,
        pub calls: Mutex<Vec<Call>>,
        pub fail_reads: Mutex<Option<ApiError>>,
        pub fail_writes: Mutex<Option<ApiError>>,
    }

    impl MemoryDiaryApi {
        pub fn with_record(date: &str, mental: i32, diary: &str) -> Self {
            let api = Self::default();
            api.insert(date, mental, diary);
            api
        }

        pub fn insert(&self, date: &str, mental: i32, diary: &str) {
            self.records.lock().unwrap().insert(
                date.to_string(),
                DiaryRecord {
                    date: date.to_string(),
                    mental,
                    diary: diary.to_string(),
                },
            );
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn writes(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|call| !matches!(call, Call::Get(_)))
                .collect()
        }

        fn write_failure(&self) -> Result<(), ApiError> {
            match self.fail_writes.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl DiaryApi for MemoryDiaryApi {
        async fn get_diary(&self, date: &str) -> Result<Option<DiaryRecord>, ApiError> {
            self.calls.lock().unwrap().push(Call::Get(date.to_string()));
            if let Some(err) = self.fail_reads.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.records.lock().unwrap().get(date).cloned())
        }

        async fn create_diary(&self, body: &CreateDiaryRequest) -> Result<DiaryRecord, ApiError> {
            self.calls.lock().unwrap().push(Call::Create(body.clone()));
            self.write_failure()?;
            let record = DiaryRecord {
                date: body.date.clone(),
                mental: body.mental,
                diary: body.diary.clone(),
            };
            self.records
                .lock()
                .unwrap()
                .insert(body.date.clone(), record.clone());
            Ok(record)
        }

        async fn update_diary(
            &self,
            date: &str,
            body: &UpdateDiaryRequest,
        ) -> Result<DiaryRecord, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(date.to_string(), body.clone()));
            self.write_failure()?;
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(date).ok_or(ApiError::NotFound)?;
            record.mental = body.mental;
            record.diary = body.diary.clone();
            Ok(record.clone())
        }

        async fn delete_diary(&self, date: &str) -> Result<DeleteDiaryResponse, ApiError> {
            self.calls.lock().unwrap().push(Call::Delete(date.to_string()));
            self.write_failure()?;
            self.records
                .lock()
                .unwrap()
                .remove(date)
                .ok_or(ApiError::NotFound)?;
            Ok(DeleteDiaryResponse {
                message: "deleted".to_string(),
            })
        }
    }
}
