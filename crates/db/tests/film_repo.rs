use std::time::Duration;

use filmhub_db::models::category::CreateCategory;
use filmhub_db::models::film::{CreateFilm, FilmFilter, UpdateFilm};
use filmhub_db::models::user::{CreateUser, User};
use filmhub_db::repositories::{CategoryRepo, FilmRepo, UserRepo};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: "$argon2id$test".to_string(),
            is_superuser: false,
        },
    )
    .await
    .unwrap()
}

fn film(title: &str, author_id: i64, is_published: bool) -> CreateFilm {
    CreateFilm {
        title: title.to_string(),
        description: "About.".to_string(),
        image: "film-images/abc.png".to_string(),
        is_published,
        category_id: 1,
        author_id,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_returns_joined_row(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let created = FilmRepo::create(&pool, &film("Dune", alice.id, true))
        .await
        .unwrap();

    assert_eq!(created.author_id, alice.id);
    assert_eq!(created.author_username, "alice");
    assert_eq!(created.category_slug, "uncategorized");
    assert_eq!(created.created_at, created.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_published_filter_only_on_home_and_detail(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let shown = FilmRepo::create(&pool, &film("Dune", alice.id, true))
        .await
        .unwrap();
    let hidden = FilmRepo::create(&pool, &film("Dune: Part Two", alice.id, false))
        .await
        .unwrap();

    let home = FilmRepo::list_published(&pool).await.unwrap();
    assert_eq!(home.iter().map(|f| f.id).collect::<Vec<_>>(), [shown.id]);
    assert!(FilmRepo::find_published(&pool, hidden.id)
        .await
        .unwrap()
        .is_none());
    assert!(FilmRepo::find_by_id(&pool, hidden.id).await.unwrap().is_some());

    let by_category = FilmRepo::list_by_category_slug(&pool, "uncategorized")
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);

    let search = FilmRepo::search_by_title(&pool, "dUnE").await.unwrap();
    assert_eq!(search.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    FilmRepo::create(&pool, &film("100% Wolf", alice.id, true))
        .await
        .unwrap();
    FilmRepo::create(&pool, &film("1000 Years", alice.id, true))
        .await
        .unwrap();

    let found = FilmRepo::search_by_title(&pool, "100%").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "100% Wolf");

    assert_eq!(FilmRepo::search_by_title(&pool, "").await.unwrap().len(), 2);
    assert!(FilmRepo::search_by_title(&pool, "_")
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_keeps_image_and_refreshes_updated_at(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let created = FilmRepo::create(&pool, &film("Dune", alice.id, true))
        .await
        .unwrap();

    // NOW() is the transaction start time; step past it.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = FilmRepo::update(
        &pool,
        created.id,
        &UpdateFilm {
            title: "Dune (1984)".to_string(),
            description: "Lynch.".to_string(),
            image: None,
            is_published: false,
            category_id: 1,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Dune (1984)");
    assert_eq!(updated.image, created.image);
    assert_eq!(updated.author_id, alice.id);
    assert!(!updated.is_published);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let missing = FilmRepo::update(
        &pool,
        9999,
        &UpdateFilm {
            title: "x".to_string(),
            description: "x".to_string(),
            image: None,
            is_published: true,
            category_id: 1,
        },
    )
    .await
    .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_returns_row_and_removes_it(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let created = FilmRepo::create(&pool, &film("Dune", alice.id, true))
        .await
        .unwrap();

    let deleted = FilmRepo::delete(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(deleted.title, "Dune");
    assert_eq!(deleted.author_username, "alice");

    assert!(FilmRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
    assert!(FilmRepo::delete(&pool, created.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_filter_and_set_published(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let mut heat = film("Heat", alice.id, false);
    heat.description = "A heist in Los Angeles.".to_string();
    let heat = FilmRepo::create(&pool, &heat).await.unwrap();
    FilmRepo::create(&pool, &film("Dune", alice.id, true))
        .await
        .unwrap();

    let by_text = FilmRepo::list_filtered(
        &pool,
        &FilmFilter {
            query: Some("HEIST".to_string()),
            published: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(by_text.len(), 1);

    let unpublished = FilmRepo::list_filtered(
        &pool,
        &FilmFilter {
            query: None,
            published: Some(false),
        },
    )
    .await
    .unwrap();
    assert_eq!(unpublished.len(), 1);
    assert_eq!(unpublished[0].id, heat.id);

    let published = FilmRepo::set_published(&pool, heat.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(published.is_published);
    assert_eq!(FilmRepo::list_published(&pool).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_delete_cascades(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let drama = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Drama".to_string(),
            slug: "drama".to_string(),
        },
    )
    .await
    .unwrap();
    let mut input = film("Heat", alice.id, true);
    input.category_id = drama.id;
    let created = FilmRepo::create(&pool, &input).await.unwrap();

    assert!(CategoryRepo::delete(&pool, drama.id).await.unwrap());
    assert!(FilmRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}
