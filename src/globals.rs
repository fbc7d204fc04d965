use crate::auth::{AuthService, SessionContext};
use crate::config::AppConfig;
use crate::data_source::{self, DataSource};
use crate::domains::campaign::{CampaignService, CampaignServiceImpl};
use crate::domains::project::{ProjectService, ProjectServiceImpl};
use crate::domains::user::{UserService, UserServiceImpl};
use crate::ffi::error::{FFIError, FFIResult};
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: Mutex<()> = Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    static ref CONFIG: Mutex<Option<Arc<AppConfig>>> = Mutex::new(None);
    static ref SESSION: Mutex<Option<SessionContext>> = Mutex::new(None);
    static ref DATA_SOURCE: Mutex<Option<Arc<dyn DataSource>>> = Mutex::new(None);

    static ref AUTH_SERVICE: Mutex<Option<Arc<AuthService>>> = Mutex::new(None);
    static ref CAMPAIGN_SERVICE: Mutex<Option<Arc<dyn CampaignService>>> = Mutex::new(None);
    static ref PROJECT_SERVICE: Mutex<Option<Arc<dyn ProjectService>>> = Mutex::new(None);
    static ref USER_SERVICE: Mutex<Option<Arc<dyn UserService>>> = Mutex::new(None);
}

pub fn get_config() -> FFIResult<Arc<AppConfig>> {
    CONFIG.lock().map_err(|_| FFIError::internal("CONFIG lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("Configuration not initialized".to_string()))
}
pub fn get_session() -> FFIResult<SessionContext> {
    SESSION.lock().map_err(|_| FFIError::internal("SESSION lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("Session context not initialized".to_string()))
}
pub fn get_data_source() -> FFIResult<Arc<dyn DataSource>> {
    DATA_SOURCE.lock().map_err(|_| FFIError::internal("DATA_SOURCE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("DataSource not initialized".to_string()))
}
pub fn get_auth_service() -> FFIResult<Arc<AuthService>> {
    AUTH_SERVICE.lock().map_err(|_| FFIError::internal("AUTH_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("AuthService not initialized".to_string()))
}
pub fn get_campaign_service() -> FFIResult<Arc<dyn CampaignService>> {
    CAMPAIGN_SERVICE.lock().map_err(|_| FFIError::internal("CAMPAIGN_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("CampaignService not initialized".to_string()))
}
pub fn get_project_service() -> FFIResult<Arc<dyn ProjectService>> {
    PROJECT_SERVICE.lock().map_err(|_| FFIError::internal("PROJECT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("ProjectService not initialized".to_string()))
}
pub fn get_user_service() -> FFIResult<Arc<dyn UserService>> {
    USER_SERVICE.lock().map_err(|_| FFIError::internal("USER_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("UserService not initialized".to_string()))
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Builds the data source and services from `config`. Only the first
/// successful call has an effect.
pub fn initialize(config: AppConfig) -> FFIResult<()> {
    let _guard = INIT_MUTEX
        .lock()
        .map_err(|_| FFIError::internal("INIT_MUTEX lock poisoned".to_string()))?;

    if INITIALIZED.load(Ordering::Acquire) {
        log::debug!("Library already initialized");
        return Ok(());
    }

    let result = initialize_internal(config);
    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }
    result
}

fn initialize_internal(config: AppConfig) -> FFIResult<()> {
    init_logging();
    log::info!("Starting initialization");

    config.validate()?;
    log::debug!("Data source: {}", config.data_source);
    log::debug!("API base URL: {}", config.api_root());

    let config = Arc::new(config);
    let session = SessionContext::new();
    let data_source = data_source::from_config(&config)?;

    let auth_service = Arc::new(AuthService::new(data_source.clone(), session.clone()));
    let campaign_service: Arc<dyn CampaignService> = Arc::new(CampaignServiceImpl::new(
        data_source.clone(),
        config.min_donation,
        config.request_timeout_secs,
    ));
    let project_service: Arc<dyn ProjectService> =
        Arc::new(ProjectServiceImpl::new(data_source.clone(), config.request_timeout_secs));
    let user_service: Arc<dyn UserService> =
        Arc::new(UserServiceImpl::new(data_source.clone(), config.request_timeout_secs));

    *CONFIG.lock().map_err(|_| FFIError::internal("CONFIG lock poisoned".to_string()))? = Some(config);
    *SESSION.lock().map_err(|_| FFIError::internal("SESSION lock poisoned".to_string()))? = Some(session);
    *DATA_SOURCE.lock().map_err(|_| FFIError::internal("DATA_SOURCE lock poisoned".to_string()))? = Some(data_source);
    *AUTH_SERVICE.lock().map_err(|_| FFIError::internal("AUTH_SERVICE lock poisoned".to_string()))? = Some(auth_service);
    *CAMPAIGN_SERVICE.lock().map_err(|_| FFIError::internal("CAMPAIGN_SERVICE lock poisoned".to_string()))? = Some(campaign_service);
    *PROJECT_SERVICE.lock().map_err(|_| FFIError::internal("PROJECT_SERVICE lock poisoned".to_string()))? = Some(project_service);
    *USER_SERVICE.lock().map_err(|_| FFIError::internal("USER_SERVICE lock poisoned".to_string()))? = Some(user_service);

    log::info!("Initialization complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise debug builds log at debug and release builds at info.
fn init_logging() {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).try_init();
}
