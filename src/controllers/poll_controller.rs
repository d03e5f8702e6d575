use axum::{http::StatusCode, Extension, Json};
use tracing::info;

use crate::{
    config::startup::AppState,
    dtos::{
        requests::{
            AppJson, CreatePollDTO, DeletePollDTO, EditPollDTO, PollInfoDTO, UpdatePollDTO, VoteDTO,
        },
        responses::{ApiResponse, CreatedPollData, PollInfoData, UserPollsData},
    },
    error::{AppError, ValidationError},
    middleware::auth::Identity,
    services::poll_service::PollService,
};

//?POST:: api/quick-poll/create
pub async fn create_poll(
    Extension(state): Extension<AppState>,
    identity: Identity,
    AppJson(payload): AppJson<CreatePollDTO>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedPollData>>), AppError> {
    let new_poll = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    let created = poll_service
        .create(new_poll, identity.user_id().map(String::from))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            StatusCode::CREATED,
            "Poll created successfully",
            Some(created),
        )),
    ))
}

//?POST:: api/quick-poll/info
pub async fn poll_info(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<PollInfoDTO>,
) -> Result<Json<ApiResponse<PollInfoData>>, AppError> {
    let lookup = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    let poll = poll_service.read(lookup).await?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "Poll retrieved successfully",
        Some(PollInfoData { poll }),
    )))
}

//?POST:: api/quick-poll/edit
pub async fn edit_poll(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<EditPollDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let edit = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    poll_service.edit(edit).await?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "Poll updated successfully",
        None,
    )))
}

//?POST:: api/quick-poll/update
pub async fn update_poll(
    Extension(state): Extension<AppState>,
    identity: Identity,
    payload: Result<AppJson<UpdatePollDTO>, AppError>,
) -> Result<Json<ApiResponse<PollInfoData>>, AppError> {
    // Who is asking is settled before what they sent.
    let anonymous = identity.user_id().is_none();
    let payload = match payload {
        Ok(AppJson(payload)) => payload,
        Err(_) if anonymous => return Err(AppError::AuthenticationRequired),
        Err(rejection) => return Err(rejection),
    };
    if anonymous && !payload.has_admin_token() {
        return Err(AppError::AuthenticationRequired);
    }

    let update = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    let poll = poll_service.update(update, identity.user_id()).await?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "Poll updated successfully",
        Some(PollInfoData { poll }),
    )))
}

//?POST:: api/quick-poll/delete
pub async fn delete_poll(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<DeletePollDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let access = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    poll_service.delete(access).await?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "Poll deleted successfully",
        None,
    )))
}

//?POST:: api/quick-poll/vote
pub async fn cast_vote(
    Extension(state): Extension<AppState>,
    identity: Identity,
    AppJson(payload): AppJson<VoteDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let cast = payload.validate()?;
    let poll_service = PollService::new(state.repository);
    poll_service.vote(cast, identity.user_id()).await?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "Vote updated successfully",
        None,
    )))
}

//*GET:: api/quick-poll/user-polls
pub async fn user_polls(
    Extension(state): Extension<AppState>,
    identity: Identity,
) -> Result<Json<ApiResponse<UserPollsData>>, AppError> {
    let user_id = identity.require()?;
    if user_id.trim().is_empty() {
        return Err(ValidationError::MissingUserId.into());
    }

    let poll_service = PollService::new(state.repository);
    let polls = poll_service.list_by_creator(user_id).await?;
    info!("Fetched {} polls for user {}", polls.len(), user_id);

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        "User polls fetched successfully",
        Some(UserPollsData { polls }),
    )))
}

//*GET:: api/quick-poll/health
pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success(StatusCode::OK, "ok", None))
}
