//! Integration tests for the superuser administration pages.

mod common;

use axum::http::StatusCode;
use common::{body_string, build_test_app, film_form, redirect_target};
use filmhub_db::store::Store;

#[tokio::test]
async fn admin_pages_require_a_superuser() {
    let app = build_test_app();
    let alice = app.create_user("alice", false).await;

    let response = app.get("/admin/films/").await;
    assert_eq!(redirect_target(&response), "/login/");

    let response = app.client_for(&alice).get("/admin/categories/").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client_for(&alice)
        .post_form("/admin/categories/", &[("name", "Drama"), ("slug", "drama")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store.find_category_by_slug("drama").await.unwrap().is_none());
}

#[tokio::test]
async fn admin_index_redirects_to_films() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let response = app.client_for(&root).get("/admin/").await;
    assert_eq!(redirect_target(&response), "/admin/films/");
}

#[tokio::test]
async fn film_list_filters_by_query_and_published_state() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let alice = app.create_user("alice", false).await;
    app.create_film("Solaris", &alice, 1, true).await;
    app.create_film("Stalker", &alice, 1, false).await;
    let mut client = app.client_for(&root);

    let html = client.page("/admin/films/").await;
    assert!(html.contains("Solaris"));
    assert!(html.contains("Stalker"));

    let html = client.page("/admin/films/?published=no").await;
    assert!(!html.contains("Solaris"));
    assert!(html.contains("Stalker"));

    // Descriptions are searched too.
    let html = client.page("/admin/films/?q=about+sol").await;
    assert!(html.contains("Solaris"));
    assert!(!html.contains("Stalker"));
}

#[tokio::test]
async fn publish_toggle_updates_flag() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let alice = app.create_user("alice", false).await;
    let film = app.create_film("Stalker", &alice, 1, false).await;
    let mut client = app.client_for(&root);
    let uri = format!("/admin/films/{}/published", film.id);

    let response = client.post_form(&uri, &[("is_published", "on")]).await;
    assert_eq!(redirect_target(&response), "/admin/films/");
    let published = app.film(film.id).await.unwrap();
    assert!(published.is_published);
    assert!(published.updated_at >= film.updated_at);
    assert!(client.page("/admin/films/").await.contains("The film Stalker is now published."));

    client.post_form(&uri, &[]).await;
    assert!(!app.film(film.id).await.unwrap().is_published);

    let response = client.post_form("/admin/films/9999/published", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_can_be_created_and_deleted() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let alice = app.create_user("alice", false).await;
    let mut client = app.client_for(&root);

    let response = client
        .post_form("/admin/categories/", &[("name", "Drama"), ("slug", "drama")])
        .await;
    assert_eq!(redirect_target(&response), "/admin/categories/");
    let drama = app.store.find_category_by_slug("drama").await.unwrap().unwrap();
    assert_eq!(drama.name, "Drama");

    let html = client.page("/admin/categories/").await;
    assert!(html.contains("The category Drama was added."));
    assert!(html.contains("href=\"/category/drama/\""));

    let film = app.create_film("Ivan", &alice, drama.id, true).await;
    let response = client
        .post_form(&format!("/admin/categories/{}/delete", drama.id), &[])
        .await;
    assert_eq!(redirect_target(&response), "/admin/categories/");
    assert!(app.store.find_category_by_slug("drama").await.unwrap().is_none());
    assert!(app.film(film.id).await.is_none(), "films go with their category");
}

#[tokio::test]
async fn deleting_a_category_removes_its_film_images() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let alice = app.create_user("alice", false).await;
    let drama = app.create_category("Drama", "drama").await;

    let response = app
        .client_for(&alice)
        .post_multipart("/add_film/", film_form("Solaris", drama.id))
        .await;
    let location = redirect_target(&response);
    let id: i64 = location
        .trim_start_matches("/film/")
        .trim_end_matches('/')
        .parse()
        .unwrap();
    let film = app.film(id).await.unwrap();
    let path = app.media.path().join(&film.image);
    assert!(path.is_file());

    let response = app
        .client_for(&root)
        .post_form(&format!("/admin/categories/{}/delete", drama.id), &[])
        .await;
    assert_eq!(redirect_target(&response), "/admin/categories/");
    assert!(app.film(id).await.is_none());
    assert!(!path.exists(), "image file removed with the film");
}

#[tokio::test]
async fn invalid_or_duplicate_category_is_a_field_error() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let mut client = app.client_for(&root);

    let response = client
        .post_form("/admin/categories/", &[("name", "Other"), ("slug", "uncategorized")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains("Category with this slug already exists."));

    let response = client
        .post_form("/admin/categories/", &[("name", ""), ("slug", "bad slug")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("Enter a valid slug"));
}

#[tokio::test]
async fn superusers_see_the_admin_link() {
    let app = build_test_app();
    let root = app.create_user("root", true).await;
    let alice = app.create_user("alice", false).await;

    assert!(app.client_for(&root).page("/").await.contains("href=\"/admin/\""));
    assert!(!app.client_for(&alice).page("/").await.contains("href=\"/admin/\""));
}
