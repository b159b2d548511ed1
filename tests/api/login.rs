use cafe_inn::routes::authentication::login::TokenResponse;

use crate::helpers::{register_user, user_id_of, TestApp};

#[actix_web::test]
async fn post_login_with_correct_data_returns_working_token(){
    let app = TestApp::spawn_app().await;

    let response = register_user(&app, "somchai", "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = app.api_client.post(format!("{}/auth/login", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "somchai",
            "password": "test1234"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);

    let body: TokenResponse = response.json().await.unwrap();
    assert_eq!(body.token_type, "bearer");

    // The token has to resolve back to the same principal
    let response = app.api_client.get(format!("{}/users/me", app.get_app_url()))
        .bearer_auth(&body.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);

    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["username"], "somchai");
    assert_eq!(profile["user_role"], "customer");
    assert_eq!(
        profile["user_id"].as_i64().unwrap() as i32,
        user_id_of(&app, "somchai")
    );
}

#[actix_web::test]
async fn post_login_with_wrong_password_fails(){
    let app = TestApp::spawn_app().await;

    let response = register_user(&app, "somchai", "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = app.api_client.post(format!("{}/auth/login", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "somchai",
            "password": "wrongpassword"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn post_login_with_unknown_username_fails(){
    let app = TestApp::spawn_app().await;

    let response = app.api_client.post(format!("{}/auth/login", app.get_app_url()))
        .json(&serde_json::json!({
            "username": "nobody",
            "password": "test1234"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn protected_route_without_token_fails(){
    let app = TestApp::spawn_app().await;

    let response = app.api_client.get(format!("{}/users/me", app.get_app_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn protected_route_with_garbage_token_fails(){
    let app = TestApp::spawn_app().await;

    let response = app.api_client.get(format!("{}/users/me", app.get_app_url()))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
