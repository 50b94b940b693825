use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};

use super::{Message, current_user, message};
use crate::{
    AppState,
    auth::{AuthUser, bearer_token},
    error::{ApiError, ApiResult},
    extract::Json,
    id::ObjectId,
    models::{
        AccessTokenResponse, ChangeEmailRequest, ChangePasswordRequest, EditAccountRequest,
        EmailRequest, FavoriteCategoriesRequest, LoginRequest, NewUser, NewsSummary,
        ResetPasswordRequest, SignUpRequest, TokenPair, UserProfile,
    },
    notifier::{TokenNotice, TokenPurpose},
    password::{hash_password_async, verify_password_async},
    repository::{NewsOrder, NewsQuery},
    token::{EmailClaims, SessionClaims, TokenClass},
    validation::{self, Pagination},
};

/// login
///
/// Exchanges email and password for an access/refresh token pair. Unknown email and
/// wrong password get the same answer.
#[utoipa::path(
    post,
    path = "/account/login",
    tag = "account",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 400, description = "Invalid email or password", body = String)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let email = validation::EMAIL.check(payload.email.as_ref())?;
    let password = validation::PASSWORD.check(payload.password.as_ref())?;

    let invalid = || ApiError::validation("Invalid email or password");
    let user = state.repo.find_user_by_email(&email).await?.ok_or_else(invalid)?;
    if !verify_password_async(user.password_hash.clone(), password).await? {
        return Err(invalid());
    }

    let claims = SessionClaims {
        sub: user.id,
        is_admin: Some(user.is_admin),
    };

    Ok(Json(TokenPair {
        access_token: state.tokens.issue(TokenClass::Access, &claims)?,
        refresh_token: state.tokens.issue(TokenClass::Refresh, &claims)?,
    }))
}

/// forgot_password_link
#[utoipa::path(
    post,
    path = "/account/forgot-password-link",
    tag = "account",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset token issued", body = String),
        (status = 400, description = "Validation failure or unknown email", body = String)
    )
)]
pub async fn forgot_password_link(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> ApiResult<Message> {
    let email = validation::EMAIL.check(payload.email.as_ref())?;

    if state.repo.find_user_by_email(&email).await?.is_none() {
        return Err(ApiError::validation("Email does not exists"));
    }

    let token = state
        .tokens
        .issue(TokenClass::ForgotPassword, &EmailClaims { email: email.clone() })?;

    state
        .notifier
        .deliver(TokenNotice {
            purpose: TokenPurpose::ForgotPassword,
            email,
            token,
        })
        .await;

    Ok(message(StatusCode::OK, "Email send successfully"))
}

/// reset_password
///
/// Sets a new password for the email carried by a forgot-password token.
#[utoipa::path(
    patch,
    path = "/account/forgot-password/{token}",
    tag = "account",
    params(("token" = String, Path, description = "Forgot-password token")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Invalid or expired token", body = String)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Message> {
    let EmailClaims { email } = state.tokens.verify(TokenClass::ForgotPassword, &token)?;
    let new_password = validation::NEW_PASSWORD.check(payload.new_password.as_ref())?;

    let password_hash = hash_password_async(new_password).await?;
    if !state.repo.set_password_by_email(&email, &password_hash).await? {
        return Err(ApiError::not_found("User does not exist"));
    }

    Ok(message(StatusCode::OK, "Password changed successfully"))
}

/// sign_up_link
#[utoipa::path(
    post,
    path = "/account/sign-up-link",
    tag = "account",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Sign-up token issued", body = String),
        (status = 400, description = "Validation failure", body = String)
    )
)]
pub async fn sign_up_link(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> ApiResult<Message> {
    let email = validation::EMAIL.check(payload.email.as_ref())?;

    let token = state
        .tokens
        .issue(TokenClass::SignUp, &EmailClaims { email: email.clone() })?;

    state
        .notifier
        .deliver(TokenNotice {
            purpose: TokenPurpose::SignUp,
            email,
            token,
        })
        .await;

    Ok(message(StatusCode::OK, "Link send successfully"))
}

/// sign_up
///
/// Creates the account for the email carried by a sign-up token. The response never
/// includes the password hash.
#[utoipa::path(
    post,
    path = "/account/sign-up/{token}",
    tag = "account",
    params(("token" = String, Path, description = "Sign-up token")),
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Invalid or expired token", body = String),
        (status = 409, description = "Email already taken", body = String)
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let EmailClaims { email } = state.tokens.verify(TokenClass::SignUp, &token)?;
    let name = validation::SIGN_UP_NAME.check(payload.name.as_ref())?;

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already taken"));
    }

    let password = validation::SIGN_UP_PASSWORD.check(payload.password.as_ref())?;
    let password_hash = hash_password_async(password).await?;

    let user = state
        .repo
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "Account created");
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// change_password
#[utoipa::path(
    patch,
    path = "/account/change-password",
    tag = "account",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation failure or wrong old password", body = String),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn change_password(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Message> {
    let old_password = validation::OLD_PASSWORD.check(payload.old_password.as_ref())?;
    let new_password = validation::NEW_PASSWORD.check(payload.new_password.as_ref())?;

    let user = current_user(&state.repo, &id).await?;
    if !verify_password_async(user.password_hash.clone(), old_password).await? {
        return Err(ApiError::validation("Password does not match"));
    }

    let password_hash = hash_password_async(new_password).await?;
    state.repo.set_password(&id, &password_hash).await?;

    Ok(message(StatusCode::OK, "Password changed successfully"))
}

/// change_email_link
///
/// Re-authenticates with the current password and sends a change-email token to the
/// new address.
#[utoipa::path(
    patch,
    path = "/account/change-email-link",
    tag = "account",
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "Change-email token issued", body = String),
        (status = 400, description = "Validation failure or wrong password", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 409, description = "Email already taken", body = String)
    )
)]
pub async fn change_email_link(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangeEmailRequest>,
) -> ApiResult<Message> {
    let email = validation::EMAIL.check(payload.email.as_ref())?;
    let password = validation::PASSWORD.check(payload.password.as_ref())?;

    let user = current_user(&state.repo, &id).await?;
    if !verify_password_async(user.password_hash.clone(), password).await? {
        return Err(ApiError::validation("Password does not match"));
    }

    if let Some(owner) = state.repo.find_user_by_email(&email).await? {
        if owner.id != user.id {
            return Err(ApiError::conflict("Email already taken"));
        }
    }

    let token = state
        .tokens
        .issue(TokenClass::ChangeEmail, &EmailClaims { email: email.clone() })?;

    state
        .notifier
        .deliver(TokenNotice {
            purpose: TokenPurpose::ChangeEmail,
            email,
            token,
        })
        .await;

    Ok(message(StatusCode::OK, "Email sent successfully"))
}

/// change_email
#[utoipa::path(
    patch,
    path = "/account/change-email/{token}",
    tag = "account",
    params(("token" = String, Path, description = "Change-email token")),
    responses(
        (status = 200, description = "Email changed", body = String),
        (status = 401, description = "Unauthorized or invalid token", body = String),
        (status = 409, description = "Email already taken", body = String)
    )
)]
pub async fn change_email(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Message> {
    let EmailClaims { email } = state.tokens.verify(TokenClass::ChangeEmail, &token)?;
    let user = current_user(&state.repo, &id).await?;

    if let Some(owner) = state.repo.find_user_by_email(&email).await? {
        if owner.id != user.id {
            return Err(ApiError::conflict("Email already taken"));
        }
    }

    state.repo.set_email(&user.id, &email).await?;
    Ok(message(StatusCode::OK, "Email changed successfully"))
}

/// edit_account
///
/// Renames the caller and re-syncs the author name stored on every comment they wrote.
#[utoipa::path(
    patch,
    path = "/account/edit-account",
    tag = "account",
    request_body = EditAccountRequest,
    responses(
        (status = 200, description = "Account edited", body = String),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn edit_account(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<EditAccountRequest>,
) -> ApiResult<Message> {
    let name = validation::ACCOUNT_NAME.check(payload.name.as_ref())?;
    let user = current_user(&state.repo, &id).await?;

    state.repo.set_name(&user.id, &name).await?;
    let renamed = state.repo.rename_comment_author(&user.id, &name).await?;
    tracing::debug!(user_id = %user.id, comments = renamed, "Comment author re-synced");

    Ok(message(StatusCode::OK, "Account edited successfully"))
}

/// refresh_token
///
/// Reads a refresh token from the bearer header and mints a new access token with the
/// same claims.
#[utoipa::path(
    patch,
    path = "/account/refresh-token",
    tag = "account",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Missing or invalid refresh token", body = String)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AccessTokenResponse>> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let claims: SessionClaims = state.tokens.verify(TokenClass::Refresh, token)?;

    Ok(Json(AccessTokenResponse {
        access_token: state.tokens.issue(TokenClass::Access, &claims)?,
    }))
}

/// get_account
#[utoipa::path(
    get,
    path = "/account",
    tag = "account",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "User does not exist", body = String)
    )
)]
pub async fn get_account(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    let user = current_user(&state.repo, &id).await?;
    Ok(Json(user.into()))
}

/// favorite_news
///
/// The caller's favorite news, newest first.
#[utoipa::path(
    get,
    path = "/account/favorite-news",
    tag = "account",
    params(Pagination),
    responses(
        (status = 200, description = "Favorite news", body = [NewsSummary]),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn favorite_news(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<NewsSummary>>> {
    let user = current_user(&state.repo, &id).await?;

    let news = state
        .repo
        .query_news(&NewsQuery {
            ids: Some(user.favorite_news_ids),
            order: NewsOrder::Newest,
            page: pagination.page(),
            ..NewsQuery::default()
        })
        .await?;

    Ok(Json(news.into_iter().map(NewsSummary::from).collect()))
}

/// add_favorite_news
#[utoipa::path(
    post,
    path = "/account/favorite-news/{news_id}",
    tag = "account",
    params(("news_id" = String, Path, description = "News id")),
    responses(
        (status = 201, description = "Added to favorites", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "News does not exists", body = String),
        (status = 409, description = "Already a favorite", body = String)
    )
)]
pub async fn add_favorite_news(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(news_id): Path<String>,
) -> ApiResult<Message> {
    let news_id = validation::parse_id(&news_id, || ApiError::not_found("News does not exists"))?;

    if state.repo.find_news(&news_id).await?.is_none() {
        return Err(ApiError::not_found("News does not exists"));
    }

    let user = current_user(&state.repo, &id).await?;
    if user.favorite_news_ids.contains(&news_id) {
        return Err(ApiError::conflict("Already added to favorie list"));
    }

    state.repo.push_favorite_news(&user.id, &news_id).await?;
    Ok(message(StatusCode::CREATED, "Added to favorite list successfully"))
}

/// remove_favorite_news
///
/// Removing an id that is not a favorite, or not an id at all, still succeeds.
#[utoipa::path(
    delete,
    path = "/account/favorite-news/{news_id}",
    tag = "account",
    params(("news_id" = String, Path, description = "News id")),
    responses(
        (status = 200, description = "Removed from favorites", body = String),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn remove_favorite_news(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(news_id): Path<String>,
) -> ApiResult<Message> {
    let user = current_user(&state.repo, &id).await?;

    if let Some(news_id) = ObjectId::parse(&news_id) {
        if user.favorite_news_ids.contains(&news_id) {
            state.repo.pull_favorite_news(&user.id, &news_id).await?;
        }
    }

    Ok(message(StatusCode::OK, "Removed from favorite list"))
}

/// favorite_categories
#[utoipa::path(
    get,
    path = "/account/favorite-categories",
    tag = "account",
    responses(
        (status = 200, description = "Favorite category ids", body = [ObjectId]),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn favorite_categories(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ObjectId>>> {
    let user = current_user(&state.repo, &id).await?;
    Ok(Json(user.favorite_category_ids))
}

/// set_favorite_categories
///
/// Replaces the caller's favorite categories. Every id must name an existing category;
/// repeated ids are stored once.
#[utoipa::path(
    post,
    path = "/account/favorite-categories",
    tag = "account",
    request_body = FavoriteCategoriesRequest,
    responses(
        (status = 200, description = "Favorite categories replaced", body = String),
        (status = 400, description = "Validation failure", body = String),
        (status = 401, description = "Unauthorized", body = String)
    )
)]
pub async fn set_favorite_categories(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<FavoriteCategoriesRequest>,
) -> ApiResult<Message> {
    let mut category_ids = validation::check_category_ids(payload.category_ids.as_ref())?;

    let mut seen = std::collections::HashSet::new();
    category_ids.retain(|id| seen.insert(id.clone()));

    let existing = state.repo.count_categories(&category_ids).await?;
    if existing != category_ids.len() as u64 {
        return Err(ApiError::validation("Invalid category id"));
    }

    let user = current_user(&state.repo, &id).await?;
    state.repo.set_favorite_categories(&user.id, &category_ids).await?;

    Ok(message(StatusCode::OK, "Category ids created successfully"))
}
