use crate::api::HttpDiaryApi;
use crate::cache::DiaryCache;
use crate::config::Config;
use crate::controller::DiaryFormController;
use crate::errors::ApiError;
use crate::navigate::PendingNavigation;
use crate::notify::ToastLog;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type Controller = DiaryFormController<HttpDiaryApi>;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Mutex<Controller>>,
    pub cache: DiaryCache<HttpDiaryApi>,
    pub toasts: ToastLog,
    pub navigation: PendingNavigation,
    pub list_path: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, ApiError> {
        let api = Arc::new(HttpDiaryApi::new(&config.api_url, config.api_timeout)?);
        let cache = DiaryCache::new(api);
        let toasts = ToastLog::new();
        let navigation = PendingNavigation::new();
        let controller = DiaryFormController::mount(
            cache.clone(),
            Arc::new(toasts.clone()),
            Arc::new(navigation.clone()),
            config.form_options(),
        )
        .await;

        Ok(Self {
            controller: Arc::new(Mutex::new(controller)),
            cache,
            toasts,
            navigation,
            list_path: config.list_path.clone(),
        })
    }
}
