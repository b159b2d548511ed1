use crate::helpers::{create_admin_and_login, create_staff_and_login, create_table, table_status, TestApp};

#[actix_web::test]
async fn admin_creates_table_starting_empty(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;

    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    assert_eq!(table_status(&app, table_id), "empty");
}

#[actix_web::test]
async fn post_table_requires_admin(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let response = app.api_client.post(format!("{}/tables", app.get_app_url()))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({
            "table_number": "A1",
            "capacity": 4
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
async fn post_table_with_zero_capacity_fails(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;

    let response = app.api_client.post(format!("{}/tables", app.get_app_url()))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "table_number": "A1",
            "capacity": 0
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
}

#[actix_web::test]
async fn table_listing_is_public(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;

    create_table(&app, &admin_token, "A1", 4).await;
    create_table(&app, &admin_token, "A2", 2).await;

    let response = app.api_client.get(format!("{}/tables", app.get_app_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn put_table_overrides_status_directly(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    let response = app.api_client.put(format!("{}/tables/{}", app.get_app_url(), table_id))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "status": "reserved" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(table_status(&app, table_id), "reserved");
}

#[actix_web::test]
async fn put_table_rejects_made_up_status(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    let response = app.api_client.put(format!("{}/tables/{}", app.get_app_url(), table_id))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "status": "haunted" }))
        .send()
        .await
        .unwrap();

    // Rejected at deserialization of the closed status set
    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(table_status(&app, table_id), "empty");
}

#[actix_web::test]
async fn delete_table_requires_admin_and_removes_it(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    let response = app.api_client.delete(format!("{}/tables/{}", app.get_app_url(), table_id))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = app.api_client.delete(format!("{}/tables/{}", app.get_app_url(), table_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = app.api_client.get(format!("{}/tables/{}", app.get_app_url(), table_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
