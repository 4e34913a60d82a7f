//! Handler-level tests over in-memory repositories and image store.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::json;
use uuid::Uuid;

use api_server::handlers::configure_routes;
use api_server::state::AppState;
use fable_core::domain::{Post, Role, User};
use fable_core::ports::{ImageStore, PasswordService, TokenService};
use fable_infra::assets::{AssetCleanup, InMemoryImageStore};
use fable_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use fable_infra::database::{InMemoryPostRepository, InMemoryUserRepository};

fn services() -> (Arc<dyn TokenService>, Arc<dyn PasswordService>) {
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
    }));
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    (tokens, passwords)
}

fn state_with_images() -> (AppState, Arc<InMemoryImageStore>) {
    let images = Arc::new(InMemoryImageStore::new());
    let store: Arc<dyn ImageStore> = images.clone();
    let state = AppState {
        users: Arc::new(InMemoryUserRepository::new()),
        posts: Arc::new(InMemoryPostRepository::new()),
        cleanup: AssetCleanup::new(store.clone()),
        images: store,
    };
    (state, images)
}

macro_rules! init_app {
    ($state:expr, $tokens:expr, $passwords:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($tokens.clone()))
                .app_data(web::Data::new($passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

const BOUNDARY: &str = "----fable-test-boundary";

fn multipart_body(fields: &[(&str, &str)]) -> (String, Vec<u8>) {
    multipart_body_with_file(fields, None)
}

fn multipart_body_with_file(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

macro_rules! sign_up {
    ($app:expr, $name:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({ "fullName": $name, "email": $email, "password": $password }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body
    }};
}

macro_rules! create_post {
    ($app:expr, $token:expr, $title:expr, $content:expr) => {{
        let (content_type, body) = multipart_body(&[("title", $title), ("content", $content)]);
        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }};
}

#[actix_web::test]
async fn test_register_then_login_round_trip() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let signed_up = sign_up!(app, "Ada Lovelace", "Ada@Example.com", "s3cret");
    assert_eq!(signed_up["role"], "user");
    let user_id: Uuid = serde_json::from_value(signed_up["userId"].clone()).unwrap();

    // Email was case-normalized; sign-in with the same credentials works.
    let req = test::TestRequest::post()
        .uri("/auth/sign-in")
        .set_json(json!({ "email": "ada@example.com", "password": "s3cret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;

    let claims = tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.role, Role::User);
}

#[actix_web::test]
async fn test_sign_up_validation() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    for body in [
        json!({ "email": "a@b.c", "password": "secret" }),
        json!({ "fullName": "Ada Lovelace", "password": "secret" }),
        json!({ "fullName": "Ada Lovelace", "email": "a@b.c" }),
        json!({ "fullName": "Ada", "email": "a@b.c", "password": "secret" }),
        json!({ "fullName": "Ada Lovelace", "email": "not-an-email", "password": "secret" }),
        json!({ "fullName": "Ada Lovelace", "email": "a@b.c", "password": "short" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_duplicate_email_rejected() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    sign_up!(app, "Ada Lovelace", "ada@example.com", "s3cret");

    let req = test::TestRequest::post()
        .uri("/auth/sign-up")
        .set_json(json!({ "fullName": "Other Ada", "email": "ada@example.com", "password": "s3cret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_sign_in_same_error_for_unknown_user_and_wrong_password() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    sign_up!(app, "Ada Lovelace", "ada@example.com", "s3cret");

    let mut details = Vec::new();
    for body in [
        json!({ "email": "nobody@example.com", "password": "s3cret" }),
        json!({ "email": "ada@example.com", "password": "wrong!" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        details.push(body["detail"].clone());
    }
    assert_eq!(details[0], details[1]);
}

#[actix_web::test]
async fn test_access_guard_failure_modes() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    // Missing header
    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "You do not have permission");

    // Wrong scheme
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", "Token abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Invalid authorization format");

    // Empty token
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", "Bearer "))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Invalid or expired token");
}

#[actix_web::test]
async fn test_users_list_excludes_password() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let signed_up = sign_up!(app, "Ada Lovelace", "ada@example.com", "s3cret");
    let token = signed_up["token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("passwordHash").is_none());
    assert_eq!(users[0]["fullName"], "Ada Lovelace");
}

#[actix_web::test]
async fn test_get_user_by_id_errors() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let signed_up = sign_up!(app, "Ada Lovelace", "ada@example.com", "s3cret");
    let token = signed_up["token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/users/not-a-uuid")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}", Uuid::new_v4()))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_mutation_requires_ownership() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let bob = sign_up!(app, "Bob Bystander", "bob@example.com", "s3cret");
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    create_post!(app, alice_token, "Alice's Post", "Hello");

    let req = test::TestRequest::get()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body[0]["id"].as_str().unwrap().to_string();
    assert_eq!(body[0]["author"]["fullName"], "Alice Author");

    // Bob may not update Alice's post.
    let (content_type, payload) = multipart_body(&[("title", "Hijacked")]);
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // An admin may.
    let mut admin = User::new(
        "Admin User".to_string(),
        "admin@example.com".to_string(),
        "hash".to_string(),
    );
    admin.role = Role::Admin;
    state.users.save(admin.clone()).await.unwrap();
    let admin_token = tokens.issue(admin.id, Role::Admin).unwrap();

    let (content_type, payload) = multipart_body(&[("title", "Moderated")]);
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {admin_token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_create_post_requires_title_and_content() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let token = alice["token"].as_str().unwrap();

    let (content_type, payload) = multipart_body(&[("title", "No content")]);
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_invalid_post_create_cleans_up_fresh_upload() {
    let (state, images) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let token = alice["token"].as_str().unwrap();

    // Cover image but no title/content: the already-stored upload must be
    // deleted again.
    let (content_type, payload) =
        multipart_body_with_file(&[], Some(("coverImage", "cover.png", &[1, 2, 3][..])));
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(images.delete_attempts(), 1);
    assert!(state.posts.find_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_post_update_replaces_and_deletes_old_cover() {
    let (state, images) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let token = alice["token"].as_str().unwrap();

    let (content_type, payload) = multipart_body_with_file(
        &[("title", "Covered"), ("content", "Content")],
        Some(("coverImage", "first.png", &[1, 2, 3][..])),
    );
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let post = state.posts.find_all().await.unwrap().remove(0);
    let old_cover = post.cover_image_url.clone().unwrap();
    assert_eq!(images.delete_attempts(), 0);

    let (content_type, payload) = multipart_body_with_file(
        &[],
        Some(("coverImage", "second.png", &[4, 5, 6][..])),
    );
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{}", post.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The old cover was deleted; the post now points at the new one.
    assert_eq!(images.delete_attempts(), 1);
    let updated = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    let new_cover = updated.cover_image_url.unwrap();
    assert_ne!(new_cover, old_cover);
    assert!(
        !images.contains(
            &fable_infra::assets::public_id_from_url(&old_cover).unwrap()
        )
    );
}

#[actix_web::test]
async fn test_reaction_toggle_and_validation() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let token = alice["token"].as_str().unwrap();
    let user_id = alice["userId"].as_str().unwrap().to_string();

    create_post!(app, token, "Reactions", "Content");
    let req = test::TestRequest::get()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body[0]["id"].as_str().unwrap().to_string();

    // Unsupported type
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/reactions"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "type": "maybe" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // like -> in likes
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/reactions"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "type": "like" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["reactions"]["likes"][0], user_id.as_str());

    // like again -> toggled off
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/reactions"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "type": "like" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["reactions"]["likes"].as_array().unwrap().is_empty());

    // like then dislike -> dislike only
    for kind in ["like", "dislike"] {
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/reactions"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "type": kind }))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["reactions"]["likes"].as_array().unwrap().is_empty());
    assert_eq!(body["reactions"]["dislikes"][0], user_id.as_str());
}

#[actix_web::test]
async fn test_comment_lifecycle_and_ownership() {
    let (state, _) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let alice = sign_up!(app, "Alice Author", "alice@example.com", "s3cret");
    let bob = sign_up!(app, "Bob Bystander", "bob@example.com", "s3cret");
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    create_post!(app, alice_token, "Comments", "Content");
    let req = test::TestRequest::get()
        .uri("/posts")
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body[0]["id"].as_str().unwrap().to_string();

    // Empty text rejected
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .set_json(json!({ "text": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Alice comments; the response is author-populated.
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .set_json(json!({ "text": "First!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["comment"]["author"]["fullName"], "Alice Author");

    // Bob cannot update or delete Alice's comment.
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .set_json(json!({ "text": "Edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {bob_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Alice updates, then deletes.
    let req = test::TestRequest::put()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .set_json(json!({ "text": "Edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["comment"]["text"], "Edited");

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Gone now
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/comments/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_user_delete_cascades_posts_and_images() {
    let (state, images) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    // Seed a user with an avatar and three posts with cover images.
    let mut user = User::new(
        "Cass Cade".to_string(),
        "cass@example.com".to_string(),
        "hash".to_string(),
    );
    user.avatar_url = Some(images.seed("avatar", "png"));
    state.users.save(user.clone()).await.unwrap();

    for i in 0..3 {
        let cover = images.seed(&format!("cover-{i}"), "jpg");
        state
            .posts
            .save(Post::new(
                user.id,
                format!("Post {i}"),
                "Content".to_string(),
                Some(cover),
            ))
            .await
            .unwrap();
    }

    let token = tokens.issue(user.id, Role::User).unwrap();

    // Another user may not delete Cass.
    let other = sign_up!(app, "Other User", "other@example.com", "s3cret");
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", user.id))
        .insert_header((
            "Authorization",
            format!("Bearer {}", other["token"].as_str().unwrap()),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Self-deletion cascades.
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", user.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(state.users.find_by_id(user.id).await.unwrap().is_none());
    assert!(state.posts.find_by_author(user.id).await.unwrap().is_empty());
    // Avatar + three covers
    assert_eq!(images.delete_attempts(), 4);
}

#[actix_web::test]
async fn test_user_delete_succeeds_when_image_cleanup_fails() {
    let (state, images) = state_with_images();
    let (tokens, passwords) = services();
    let app = init_app!(state, tokens, passwords);

    let mut user = User::new(
        "Cass Cade".to_string(),
        "cass@example.com".to_string(),
        "hash".to_string(),
    );
    user.avatar_url = Some(images.seed("avatar", "png"));
    state.users.save(user.clone()).await.unwrap();
    images.fail_deletes(true);

    let token = tokens.issue(user.id, Role::User).unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", user.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Cleanup failure is swallowed; the deletion still succeeds.
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.users.find_by_id(user.id).await.unwrap().is_none());
}
