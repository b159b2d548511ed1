use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use diesel::dsl::count;

use crate::helpers::{random_username, register_user, TestApp};

#[actix_web::test]
async fn post_registration_with_valid_data_creates_customer(){
    let app = TestApp::spawn_app().await;

    let response = app.api_client.post(format!("{}/auth/register", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "somchai",
            "password": "test1234",
            "name": "Somchai J.",
            "email": "somchai@example.com",
            "tel": "0812345678"
        }))
        .send()
        .await
        .expect("Failed to send request to register endpoint");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], "somchai");
    // Self-registration can never pick its own role
    assert_eq!(body["user_role"], "customer");
    assert_eq!(body["email"], "somchai@example.com");
}

#[actix_web::test]
async fn post_registration_adds_user_to_db(){
    let app = TestApp::spawn_app().await;

    let new_username = random_username();
    let response = register_user(&app, &new_username, "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    let mut conn = app.pool.get().unwrap();

    let rows: i64 = {
        use cafe_inn::schema::users::dsl::*;

        users.filter(username.eq(new_username))
            .select(count(username))
            .first(&mut conn)
            .unwrap()
    };

    assert_eq!(rows, 1)
}

#[actix_web::test]
async fn post_registration_with_duplicate_username_fails(){
    let app = TestApp::spawn_app().await;

    let response = register_user(&app, "somchai", "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = register_user(&app, "somchai", "different1234").await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
async fn post_registration_with_duplicate_email_fails(){
    let app = TestApp::spawn_app().await;

    let response = app.api_client.post(format!("{}/auth/register", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "somchai",
            "password": "test1234",
            "email": "shared@example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = app.api_client.post(format!("{}/auth/register", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "somsri",
            "password": "test1234",
            "email": "shared@example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
async fn post_registration_with_short_username_fails(){
    let app = TestApp::spawn_app().await;

    let response = register_user(&app, "ab", "test1234").await;
    assert_eq!(response.status().as_u16(), 422);
}

#[actix_web::test]
async fn post_registration_with_short_password_fails(){
    let app = TestApp::spawn_app().await;

    let response = register_user(&app, "somchai", "abc").await;
    assert_eq!(response.status().as_u16(), 422);
}
