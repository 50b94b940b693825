mod common;

use axum::http::{Method, StatusCode, header};
use common::{TEST_PASSWORD, test_app};
use newsroom_api::{
    id::ObjectId,
    models::NewComment,
    notifier::TokenPurpose,
    repository::Repository,
    token::{EmailClaims, SessionClaims, TokenClass},
};
use serde_json::json;

// --- Sign-up & Login ---

#[tokio::test]
async fn test_sign_up_flow_creates_user_without_password_field() {
    let app = test_app();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/sign-up-link",
            None,
            json!({ "email": "a@b.com" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Link send successfully"));

    let token = app
        .notifier
        .last_token(TokenPurpose::SignUp, "a@b.com")
        .await
        .expect("sign-up token delivered");

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/account/sign-up/{token}"),
            None,
            json!({ "name": "Al", "password": "secret12" }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["name"], "Al");
    assert_eq!(body["isAdmin"], false);
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
    assert!(ObjectId::is_valid(body["id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_sign_up_rejects_taken_email() {
    let app = test_app();
    app.seed_user("Existing", "taken@b.com", false).await;

    let token = app
        .tokens
        .issue(TokenClass::SignUp, &EmailClaims { email: "taken@b.com".into() })
        .unwrap();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/account/sign-up/{token}"),
            None,
            json!({ "name": "Al", "password": "secret12" }),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!("Email already taken"));
}

#[tokio::test]
async fn test_sign_up_rejects_token_of_another_class() {
    let app = test_app();
    let token = app
        .tokens
        .issue(TokenClass::ForgotPassword, &EmailClaims { email: "a@b.com".into() })
        .unwrap();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/account/sign-up/{token}"),
            None,
            json!({ "name": "Al", "password": "secret12" }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!("Unauthorized"));
}

#[tokio::test]
async fn test_sign_up_validates_name_after_trim() {
    let app = test_app();
    let token = app
        .tokens
        .issue(TokenClass::SignUp, &EmailClaims { email: "a@b.com".into() })
        .unwrap();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/account/sign-up/{token}"),
            None,
            json!({ "name": "  A  ", "password": "secret12" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Name must be within 2-60 characters"));
}

#[tokio::test]
async fn test_login_returns_token_pair_with_admin_claim() {
    let app = test_app();
    let admin = app.seed_user("Admin", "admin@b.com", true).await;

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/login",
            None,
            json!({ "email": "admin@b.com", "password": TEST_PASSWORD }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let access = body["accessToken"].as_str().unwrap();
    let claims: SessionClaims = app.tokens.verify(TokenClass::Access, access).unwrap();
    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.is_admin, Some(true));

    let refresh = body["refreshToken"].as_str().unwrap();
    assert!(app.tokens.verify::<SessionClaims>(TokenClass::Refresh, refresh).is_ok());
}

#[tokio::test]
async fn test_login_with_wrong_password_or_unknown_email() {
    let app = test_app();
    app.seed_user("Reader", "reader@b.com", false).await;

    for payload in [
        json!({ "email": "reader@b.com", "password": "not-the-password" }),
        json!({ "email": "nobody@b.com", "password": TEST_PASSWORD }),
    ] {
        let (status, body) = app
            .send(common::json_request(Method::POST, "/account/login", None, payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!("Invalid email or password"));
    }
}

#[tokio::test]
async fn test_login_requires_email() {
    let app = test_app();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/login",
            None,
            json!({ "email": "", "password": "x" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Email is required"));
}

// --- Password & Email ---

#[tokio::test]
async fn test_forgot_password_flow_resets_password() {
    let app = test_app();
    app.seed_user("Reader", "reader@b.com", false).await;

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/forgot-password-link",
            None,
            json!({ "email": "reader@b.com" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Email send successfully"));

    let token = app
        .notifier
        .last_token(TokenPurpose::ForgotPassword, "reader@b.com")
        .await
        .unwrap();

    let (status, _) = app
        .send(common::json_request(
            Method::PATCH,
            &format!("/account/forgot-password/{token}"),
            None,
            json!({ "newPassword": "brand-new-pass" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(common::json_request(
            Method::POST,
            "/account/login",
            None,
            json!({ "email": "reader@b.com", "password": "brand-new-pass" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_link_for_unknown_email() {
    let app = test_app();

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/forgot-password-link",
            None,
            json!({ "email": "ghost@b.com" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Email does not exists"));
    assert!(app.notifier.notices().await.is_empty());
}

#[tokio::test]
async fn test_change_password_requires_matching_old_password() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            "/account/change-password",
            Some(&token),
            json!({ "oldPassword": "wrong-one", "newPassword": "another-pass" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Password does not match"));

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            "/account/change-password",
            Some(&token),
            json!({ "oldPassword": TEST_PASSWORD, "newPassword": "short" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("New password must be within 8-20 characters"));
}

#[tokio::test]
async fn test_change_email_flow() {
    let app = test_app();
    let user = app.seed_user("Reader", "old@b.com", false).await;
    let token = app.access_token(&user);

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            "/account/change-email-link",
            Some(&token),
            json!({ "email": "new@b.com", "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Email sent successfully"));

    let change_token = app
        .notifier
        .last_token(TokenPurpose::ChangeEmail, "new@b.com")
        .await
        .unwrap();

    let (status, body) = app
        .send(common::empty_request(
            Method::PATCH,
            &format!("/account/change-email/{change_token}"),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Email changed successfully"));

    let stored = app.repo.find_user(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "new@b.com");
}

#[tokio::test]
async fn test_change_email_to_address_of_other_user_conflicts() {
    let app = test_app();
    let user = app.seed_user("Reader", "mine@b.com", false).await;
    app.seed_user("Other", "theirs@b.com", false).await;
    let token = app.access_token(&user);

    let change_token = app
        .tokens
        .issue(TokenClass::ChangeEmail, &EmailClaims { email: "theirs@b.com".into() })
        .unwrap();

    let (status, _) = app
        .send(common::empty_request(
            Method::PATCH,
            &format!("/account/change-email/{change_token}"),
            Some(&token),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_edit_account_renames_all_comments_of_user() {
    let app = test_app();
    let user = app.seed_user("Old Name", "reader@b.com", false).await;
    let category = app.seed_category("World").await;
    let first = app.seed_news("First", &category).await;
    let second = app.seed_news("Second", &category).await;

    for news in [&first, &second] {
        app.repo
            .create_comment(NewComment {
                user_name: user.name.clone(),
                comment: "Nice one".into(),
                user_id: user.id.clone(),
                news_id: news.id.clone(),
            })
            .await
            .unwrap();
    }

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            "/account/edit-account",
            Some(&app.access_token(&user)),
            json!({ "name": "  New Name " }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Account edited successfully"));

    for news in [&first, &second] {
        let (_, body) = app
            .send(common::empty_request(
                Method::GET,
                &format!("/news/{}/comments", news.id),
                None,
            ))
            .await;
        assert_eq!(body[0]["userName"], "New Name");
    }
}

#[tokio::test]
async fn test_refresh_token_reissues_access_token() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let refresh = app
        .tokens
        .issue(
            TokenClass::Refresh,
            &SessionClaims { sub: user.id.clone(), is_admin: Some(false) },
        )
        .unwrap();

    let (status, body) = app
        .send(common::empty_request(Method::PATCH, "/account/refresh-token", Some(&refresh)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let claims: SessionClaims = app
        .tokens
        .verify(TokenClass::Access, body["accessToken"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, user.id);

    // An access token is not a refresh token.
    let (status, _) = app
        .send(common::empty_request(
            Method::PATCH,
            "/account/refresh-token",
            Some(&app.access_token(&user)),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(common::empty_request(Method::PATCH, "/account/refresh-token", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_account_for_deleted_user_is_not_found() {
    let app = test_app();
    let token = app
        .tokens
        .issue(
            TokenClass::Access,
            &SessionClaims { sub: ObjectId::new(), is_admin: None },
        )
        .unwrap();

    let (status, body) = app
        .send(common::empty_request(Method::GET, "/account", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("User does not exist"));
}

// --- Request Bodies ---

#[tokio::test]
async fn test_missing_or_non_json_body_reads_as_empty_object() {
    let app = test_app();

    let requests = [
        common::empty_request(Method::POST, "/account/sign-up-link", None),
        common::raw_request(Method::POST, "/account/sign-up-link", None, Some("application/json"), ""),
        common::raw_request(Method::POST, "/account/sign-up-link", None, Some("text/plain"), "email=a@b.com"),
    ];
    for request in requests {
        let (status, headers, body) = app.send_with_headers(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(body, json!("Email is required"));
    }
    assert!(app.notifier.notices().await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_is_a_json_string_error() {
    let app = test_app();

    for raw in ["{bad", "\"just a string\"", "{\"email\": \"a@b.com\""] {
        let (status, headers, body) = app
            .send_with_headers(common::raw_request(
                Method::POST,
                "/account/login",
                None,
                Some("application/json; charset=utf-8"),
                raw,
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(body, json!("Invalid request body"));
    }
}

#[tokio::test]
async fn test_authenticated_route_without_body_reports_first_missing_field() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);

    let (status, body) = app
        .send(common::empty_request(Method::PATCH, "/account/edit-account", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Name is required"));
}

// --- Favorites ---

#[tokio::test]
async fn test_favorite_news_duplicate_conflicts_and_removal_is_idempotent() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);
    let category = app.seed_category("World").await;
    let news = app.seed_news("Headline", &category).await;
    let uri = format!("/account/favorite-news/{}", news.id);

    let (status, body) = app.send(common::empty_request(Method::POST, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!("Added to favorite list successfully"));

    let (status, body) = app.send(common::empty_request(Method::POST, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!("Already added to favorie list"));

    let (status, body) = app
        .send(common::empty_request(Method::GET, "/account/favorite-news", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], news.id.as_str());

    let (status, _) = app.send(common::empty_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    // Already gone, and not even an id: both still succeed.
    let (status, body) = app.send(common::empty_request(Method::DELETE, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Removed from favorite list"));

    let (status, _) = app
        .send(common::empty_request(
            Method::DELETE,
            "/account/favorite-news/not-an-id",
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_favorite_news_unknown_news() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);

    for id in ["not-an-id".to_string(), ObjectId::new().to_string()] {
        let (status, body) = app
            .send(common::empty_request(
                Method::POST,
                &format!("/account/favorite-news/{id}"),
                Some(&token),
            ))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!("News does not exists"));
    }
}

#[tokio::test]
async fn test_favorite_categories_replace_and_validate() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);
    let world = app.seed_category("World").await;
    let sport = app.seed_category("Sport").await;

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/account/favorite-categories",
            Some(&token),
            json!({ "categoryIds": [world.id.as_str(), sport.id.as_str(), world.id.as_str()] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Category ids created successfully"));

    let (_, body) = app
        .send(common::empty_request(Method::GET, "/account/favorite-categories", Some(&token)))
        .await;
    assert_eq!(body, json!([world.id.as_str(), sport.id.as_str()]));

    let unknown = ObjectId::new();
    let cases = [
        (json!({}), "Category ids required"),
        (json!({ "categoryIds": "nope" }), "Category ids must be a array"),
        (json!({ "categoryIds": ["nope"] }), "Invalid category id"),
        (json!({ "categoryIds": [unknown.as_str()] }), "Invalid category id"),
    ];
    for (payload, expected) in cases {
        let (status, body) = app
            .send(common::json_request(
                Method::POST,
                "/account/favorite-categories",
                Some(&token),
                payload,
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!(expected));
    }
}

// --- Categories ---

#[tokio::test]
async fn test_category_names_equal_after_trim_conflict() {
    let app = test_app();
    let admin = app.seed_user("Admin", "admin@b.com", true).await;
    let token = app.access_token(&admin);

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/categories",
            Some(&token),
            json!({ "name": "Politics" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Politics");

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/categories",
            Some(&token),
            json!({ "name": "  Politics  " }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!("Name already exists"));
}

#[tokio::test]
async fn test_category_create_requires_admin() {
    let app = test_app();
    let reader = app.seed_user("Reader", "reader@b.com", false).await;

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            "/categories",
            Some(&app.access_token(&reader)),
            json!({ "name": "Politics" }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!("Unauthorized"));
    assert!(app.repo.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_category_rename_rules() {
    let app = test_app();
    let admin = app.seed_user("Admin", "admin@b.com", true).await;
    let token = app.access_token(&admin);
    let world = app.seed_category("World").await;
    app.seed_category("Sport").await;

    let (status, _) = app
        .send(common::json_request(
            Method::PATCH,
            &format!("/categories/{}", world.id),
            Some(&token),
            json!({ "name": "Sport" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            "/categories/bogus",
            Some(&token),
            json!({ "name": "Science" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Category does not exist"));

    let (status, body) = app
        .send(common::json_request(
            Method::PATCH,
            &format!("/categories/{}", world.id),
            Some(&token),
            json!({ "name": "  Global " }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Category saved successfully"));

    let stored = app.repo.find_category(&world.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Global");
}

#[tokio::test]
async fn test_delete_category_with_invalid_id_succeeds_without_store_op() {
    let app = test_app();
    let admin = app.seed_user("Admin", "admin@b.com", true).await;
    let token = app.access_token(&admin);
    app.seed_category("World").await;

    let (status, body) = app
        .send(common::empty_request(Method::DELETE, "/categories/xyz", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Category deleted successfully"));
    assert_eq!(app.repo.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_news_lists_oldest_first() {
    let app = test_app();
    let world = app.seed_category("World").await;
    let sport = app.seed_category("Sport").await;
    let first = app.seed_news("First", &world).await;
    let second = app.seed_news("Second", &world).await;
    app.seed_news("Elsewhere", &sport).await;

    let (status, body) = app
        .send(common::empty_request(
            Method::GET,
            &format!("/categories/{}/news", world.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    // Listings leave the description out.
    assert!(body[0].get("description").is_none());

    let (status, body) = app
        .send(common::empty_request(Method::GET, "/categories/bad/news", None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Invalid category id"));
}

// --- News reads & comments ---

#[tokio::test]
async fn test_news_detail_marks_favorite() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);
    let category = app.seed_category("World").await;
    let news = app.seed_news("Headline", &category).await;
    app.repo.push_favorite_news(&user.id, &news.id).await.unwrap();

    let uri = format!("/news/{}", news.id);

    let (status, body) = app.send(common::empty_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], true);
    assert_eq!(body["title"], "Headline");
    assert_eq!(body["description"], "About Headline");

    let (_, body) = app.send(common::empty_request(Method::GET, &uri, None)).await;
    assert_eq!(body["isFavorite"], false);

    // A broken token is treated as anonymous, not rejected.
    let (status, body) = app
        .send(common::empty_request(Method::GET, &uri, Some("garbage")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], false);
}

#[tokio::test]
async fn test_news_detail_errors() {
    let app = test_app();

    let (status, body) = app.send(common::empty_request(Method::GET, "/news/123", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Invalid news id"));

    let (status, body) = app
        .send(common::empty_request(Method::GET, &format!("/news/{}", ObjectId::new()), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("News does not exist"));
}

#[tokio::test]
async fn test_news_feed_follows_favorite_categories() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let world = app.seed_category("World").await;
    let sport = app.seed_category("Sport").await;
    let world_news = app.seed_news("World news", &world).await;
    app.seed_news("Sport news", &sport).await;

    let (_, body) = app.send(common::empty_request(Method::GET, "/news", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    app.repo
        .set_favorite_categories(&user.id, &[world.id.clone()])
        .await
        .unwrap();

    let (_, body) = app
        .send(common::empty_request(Method::GET, "/news", Some(&app.access_token(&user))))
        .await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], world_news.id.as_str());
}

#[tokio::test]
async fn test_news_feed_pagination() {
    let app = test_app();
    let category = app.seed_category("World").await;
    for i in 0..5 {
        app.seed_news(&format!("News {i}"), &category).await;
    }

    let (_, body) = app
        .send(common::empty_request(Method::GET, "/news?limit=2&skip=1", None))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(common::empty_request(Method::GET, "/news?limit=abc&offset=-3", None))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_search_is_exact_title_match() {
    let app = test_app();
    let category = app.seed_category("World").await;
    let exact = app.seed_news("Election", &category).await;
    app.seed_news("Election results", &category).await;

    let (status, body) = app
        .send(common::empty_request(Method::GET, "/news/search/Election", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], exact.id.as_str());
}

#[tokio::test]
async fn test_comments_create_and_list() {
    let app = test_app();
    let author = app.seed_user("Author", "author@b.com", false).await;
    let other = app.seed_user("Other", "other@b.com", false).await;
    let category = app.seed_category("World").await;
    let news = app.seed_news("Headline", &category).await;
    let uri = format!("/news/{}/comments", news.id);

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &uri,
            Some(&app.access_token(&author)),
            json!({ "comment": "  Great read  " }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"], "Great read");
    assert_eq!(body["userName"], "Author");

    let (_, body) = app
        .send(common::empty_request(Method::GET, &uri, Some(&app.access_token(&author))))
        .await;
    assert_eq!(body[0]["isCommented"], true);

    let (_, body) = app
        .send(common::empty_request(Method::GET, &uri, Some(&app.access_token(&other))))
        .await;
    assert_eq!(body[0]["isCommented"], false);

    let (_, body) = app.send(common::empty_request(Method::GET, &uri, None)).await;
    assert_eq!(body[0]["isCommented"], false);
}

#[tokio::test]
async fn test_comment_errors() {
    let app = test_app();
    let user = app.seed_user("Author", "author@b.com", false).await;
    let token = app.access_token(&user);

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/news/{}/comments", ObjectId::new()),
            Some(&token),
            json!({ "comment": "Hello there" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Post does not exists"));

    let (status, body) = app
        .send(common::json_request(
            Method::POST,
            &format!("/news/{}/comments", ObjectId::new()),
            Some(&token),
            json!({ "comment": 42 }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Comment must be characters"));

    let (status, _) = app
        .send(common::json_request(
            Method::POST,
            &format!("/news/{}/comments", ObjectId::new()),
            None,
            json!({ "comment": "Hello there" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_openapi_document() {
    let app = test_app();

    let (status, body) = app.send(common::empty_request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, body) = app
        .send(common::empty_request(Method::GET, "/api-docs/openapi.json", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/account/login").is_some());
    assert!(body["paths"].get("/news/{id}/comments").is_some());
}

#[tokio::test]
async fn test_trailing_slash_reaches_the_same_route() {
    let app = test_app();
    let user = app.seed_user("Reader", "reader@b.com", false).await;
    let token = app.access_token(&user);
    app.seed_category("World").await;

    for uri in ["/account", "/account/"] {
        let (status, body) = app.send(common::empty_request(Method::GET, uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["email"], "reader@b.com");
    }

    let (status, body) = app.send(common::empty_request(Method::GET, "/categories/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send(common::empty_request(Method::GET, "/health/", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(common::empty_request(Method::GET, "/swagger-ui/", None)).await;
    assert_eq!(status, StatusCode::OK);
}
