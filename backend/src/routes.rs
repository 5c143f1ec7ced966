use rocket::{State, get, post, http::Status, serde::json::Json};
use tracing::{error, info, instrument};
use std::sync::{Arc, Mutex, MutexGuard};
use rustrict::CensorStr;
use shared::{validate_create_request, user_info::UserInfo, CreatePollRequest, Poll, PollId, PollSummary};
use crate::{
    config::Config,
    error::ApiError,
    rate_limiter::RateLimiter,
    store::PollStore,
};

pub struct AppState {
    pub store: Arc<Mutex<PollStore>>,
    pub vote_limiter: RateLimiter,
    pub create_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: PollStore, config: &Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            vote_limiter: RateLimiter::per_minute(config.vote_limit_per_minute),
            create_limiter: RateLimiter::per_hour(config.create_limit_per_hour),
        }
    }

    pub fn lock_store(&self) -> Result<MutexGuard<'_, PollStore>, ApiError> {
        self.store.lock().map_err(|e| {
            error!("Failed to acquire store lock: {}", e);
            ApiError::Internal("store lock poisoned".into())
        })
    }
}

fn check_combined_options_for_profanity(options: &[String]) -> Result<(), String> {
    for option in options {
        if option.is_inappropriate() {
            return Err(format!("Possible profanity detected in option: {}", option));
        }
    }

    for window_size in 2..=options.len() {
        for window in options.windows(window_size) {
            let combined = window.join("");
            if combined.is_inappropriate() {
                return Err(format!(
                    "Inappropriate content detected across options: {}",
                    window.join(", ")
                ));
            }
        }
    }

    Ok(())
}

#[get("/polls")]
pub async fn list_polls(state: &State<AppState>) -> Result<Json<Vec<PollSummary>>, ApiError> {
    Ok(Json(state.lock_store()?.list()))
}

#[get("/poll/<id>")]
pub async fn get_poll(state: &State<AppState>, id: PollId) -> Result<Json<Poll>, ApiError> {
    Ok(Json(state.lock_store()?.get(id)?))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[instrument(skip_all, fields(poll_id = id, option = option))]
#[post("/poll/<id>/vote/<option>")]
pub async fn cast_vote(
    state: &State<AppState>,
    id: PollId,
    option: i64,
    user_info: UserInfo,
) -> Result<Json<Poll>, ApiError> {
    let option = usize::try_from(option).map_err(|_| ApiError::InvalidOption)?;

    let rate_limit_key = format!("cast_vote:{}", user_info.user_fingerprint);
    state.vote_limiter.check_rate_limit(&rate_limit_key)?;

    let poll = state.lock_store()?.vote(id, option, &user_info.user_fingerprint)?;
    info!("Vote recorded for option {} (total {})", option, poll.total_votes());
    Ok(Json(poll))
}

#[instrument(skip(state, request, user_info))]
#[post("/poll/create", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Json<CreatePollRequest>,
    user_info: UserInfo,
) -> Result<Json<Poll>, ApiError> {
    let request = request.into_inner().trimmed();
    validate_create_request(&request)?;

    if request.question.is_inappropriate() {
        return Err(ApiError::Invalid(format!(
            "Possible profanity detected in question: {}", request.question
        )));
    }
    check_combined_options_for_profanity(&request.options).map_err(ApiError::Invalid)?;

    let rate_limit_key = format!("create_poll:{}", user_info.user_fingerprint);
    state.create_limiter.check_rate_limit(&rate_limit_key)?;

    let poll = state.lock_store()?.create(request);
    info!("Created poll {} with {} options", poll.id, poll.option_count());
    Ok(Json(poll))
}
