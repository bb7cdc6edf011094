//! Integration tests for viewing and editing user profiles.

mod common;

use axum::http::StatusCode;
use common::{body_string, build_test_app, redirect_target};
use filmhub_db::store::Store;

fn profile_fields<'a>(username: &'a str, email: &'a str) -> [(&'a str, &'a str); 4] {
    [
        ("username", username),
        ("first_name", "Alice"),
        ("last_name", "Liddell"),
        ("email", email),
    ]
}

#[tokio::test]
async fn profile_lists_every_film_of_the_user() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;
    app.create_film("Solaris", &alice, 1, true).await;
    app.create_film("Stalker", &alice, 1, false).await;
    app.create_film("Brazil", &bob, 1, true).await;

    let html = app.anonymous().page(&format!("/profile/{}/", alice.id)).await;
    assert!(html.contains("Profile: alice"));
    assert!(html.contains("Solaris"));
    assert!(html.contains("Stalker"));
    assert!(!html.contains("Brazil"));
    assert!(!html.contains("/edit_profile/"), "only the owner sees the edit link");

    let html = app.client_for(&alice).page(&format!("/profile/{}/", alice.id)).await;
    assert!(html.contains(&format!("/edit_profile/{}/", alice.id)));
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let app = build_test_app();
    assert_eq!(app.get("/profile/9999/").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_can_edit_profile() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;
    let mut client = app.client_for(&alice);

    let html = client.page(&format!("/edit_profile/{}/", alice.id)).await;
    assert!(html.contains("Edit profile: alice"));
    assert!(html.contains("value=\"alice@example.com\""));

    let response = client
        .post_form(
            &format!("/edit_profile/{}/", alice.id),
            &profile_fields("alice_l", "liddell@example.com"),
        )
        .await;
    assert_eq!(redirect_target(&response), format!("/profile/{}/", alice.id));

    let html = client.page(&format!("/profile/{}/", alice.id)).await;
    assert!(html.contains("Profile updated!"));
    assert!(html.contains("Alice Liddell"));

    let updated = app.store.find_user(alice.id).await.unwrap().unwrap();
    assert_eq!(updated.username, "alice_l");
    assert_eq!(updated.email, "liddell@example.com");
    assert_eq!(updated.password_hash, alice.password_hash);
}

#[tokio::test]
async fn keeping_own_username_is_not_a_conflict_but_taking_another_is() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;
    app.create_user("bob", false).await;
    let mut client = app.client_for(&alice);
    let uri = format!("/edit_profile/{}/", alice.id);

    let response = client.post_form(&uri, &profile_fields("alice", "")).await;
    assert_eq!(redirect_target(&response), format!("/profile/{}/", alice.id));

    let response = client.post_form(&uri, &profile_fields("bob", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains("A user with that username already exists."));
    assert_eq!(
        app.store.find_user(alice.id).await.unwrap().unwrap().username,
        "alice"
    );
}

#[tokio::test]
async fn invalid_profile_rerenders_with_errors() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;

    let response = app
        .client_for(&alice)
        .post_form(
            &format!("/edit_profile/{}/", alice.id),
            &profile_fields("no spaces allowed", "not-an-email"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Enter a valid username."));
    assert!(html.contains("Enter a valid email address."));
}

#[tokio::test]
async fn editing_another_profile_is_refused_even_for_superusers() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;
    let root = app.create_user("root", true).await;
    let mut client = app.client_for(&root);
    let uri = format!("/edit_profile/{}/", alice.id);

    let response = client.get(&uri).await;
    assert_eq!(redirect_target(&response), "/");

    let response = client.post_form(&uri, &profile_fields("hacked", "")).await;
    assert_eq!(redirect_target(&response), "/");

    let html = client.page("/").await;
    assert!(html.contains("You do not have permission to edit this profile!"));
    assert_eq!(
        app.store.find_user(alice.id).await.unwrap().unwrap().username,
        "alice"
    );
}

#[tokio::test]
async fn anonymous_profile_edit_is_refused() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;
    let mut client = app.anonymous();

    let response = client
        .post_form(&format!("/edit_profile/{}/", alice.id), &profile_fields("x", ""))
        .await;
    assert_eq!(redirect_target(&response), "/");
    assert!(client.page("/").await.contains("Please log in to continue."));
}
