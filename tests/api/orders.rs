use cafe_inn::db_interaction::OrderWithItems;
use chrono::{Duration, Utc};
use diesel::{ExpressionMethods, RunQueryDsl};

use crate::helpers::{create_admin_and_login, create_product, create_staff_and_login, create_table, create_user_and_login, table_status, user_id_of, TestApp};

async fn post_order(
    app: &TestApp,
    token: &str,
    payload: &serde_json::Value
) -> reqwest::Response{
    app.api_client.post(format!("{}/orders", app.get_app_url()))
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .expect("Failed to send request to orders endpoint")
}

#[actix_web::test]
async fn order_endpoints_are_closed_to_customers(){
    let app = TestApp::spawn_app().await;
    let customer_token = create_user_and_login(&app, "plaincust").await;

    let response = app.api_client.get(format!("{}/orders", app.get_app_url()))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = post_order(&app, &customer_token, &serde_json::json!({
        "items": [{ "product_id": 1, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
async fn post_order_computes_net_price_from_current_prices(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;

    // Two lines of the same product, quantities 2 and 3
    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": [
            { "product_id": product_id, "quantity": 2, "sweetness": "50%" },
            { "product_id": product_id, "quantity": 3, "milk_type": "oat" }
        ]
    })).await;

    assert_eq!(response.status().as_u16(), 201);

    let order: OrderWithItems = response.json().await.unwrap();
    assert_eq!(order.net_price, 250);
    assert_eq!(order.order_status, "pending");
    assert_eq!(order.items.len(), 2);
    assert!(order.customer_detail.is_none());

    // The stored price does not drift on re-read
    let response = app.api_client.get(format!("{}/orders/{}", app.get_app_url(), order.order_id))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let reread: OrderWithItems = response.json().await.unwrap();
    assert_eq!(reread.net_price, 250);
}

#[actix_web::test]
async fn post_order_with_tables_marks_them_full(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;
    let table_a = create_table(&app, &admin_token, "A1", 4).await;
    let table_b = create_table(&app, &admin_token, "A2", 2).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "table_ids": [table_a, table_b],
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(table_status(&app, table_a), "full");
    assert_eq!(table_status(&app, table_b), "full");
}

#[actix_web::test]
async fn post_order_with_unknown_product_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": [{ "product_id": 4242, "quantity": 1 }]
    })).await;

    assert_eq!(response.status().as_u16(), 404);

    let body = response.text().await.unwrap();
    assert!(body.contains("4242"), "error message should name the missing product id");
}

#[actix_web::test]
async fn post_order_with_unknown_customer_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "customer_id": 4242,
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn post_order_without_items_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": []
    })).await;

    assert_eq!(response.status().as_u16(), 422);
}

#[actix_web::test]
async fn post_order_with_zero_quantity_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": [{ "product_id": product_id, "quantity": 0 }]
    })).await;

    assert_eq!(response.status().as_u16(), 422);
}

#[actix_web::test]
async fn finishing_an_order_releases_its_tables(){
    let app = TestApp::spawn_app().await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;
    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "table_ids": [table_id],
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 201);

    let order: OrderWithItems = response.json().await.unwrap();
    assert_eq!(table_status(&app, table_id), "full");

    // Status change alone never touches the table
    let response = app.api_client.patch(format!("{}/orders/{}", app.get_app_url(), order.order_id))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "order_status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(table_status(&app, table_id), "full");

    // Setting finish_at is what frees it
    let response = app.api_client.patch(format!("{}/orders/{}", app.get_app_url(), order.order_id))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "finish_at": Utc::now() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(table_status(&app, table_id), "empty");
}

#[actix_web::test]
async fn patch_order_with_made_up_status_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;
    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    let order: OrderWithItems = response.json().await.unwrap();

    let response = app.api_client.patch(format!("{}/orders/{}", app.get_app_url(), order.order_id))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "order_status": "teleported" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
}

#[actix_web::test]
async fn patch_missing_order_fails(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let response = app.api_client.patch(format!("{}/orders/999", app.get_app_url()))
        .bearer_auth(&staff_token)
        .json(&serde_json::json!({ "order_status": "completed" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn listing_orders_enriches_customer_detail(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;
    create_user_and_login(&app, "regular").await;

    let customer_id = user_id_of(&app, "regular");
    let product_id = create_product(&app, &staff_token, "Latte", 50).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "customer_id": customer_id,
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 201);

    let response = app.api_client.get(format!("{}/orders", app.get_app_url()))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let listing: Vec<OrderWithItems> = response.json().await.unwrap();
    assert_eq!(listing.len(), 1);

    let detail = listing[0].customer_detail.as_ref().unwrap();
    // The test customer registered without a display name
    assert_eq!(detail.customer_name, "-");
    assert_eq!(detail.point, 0);
}

#[actix_web::test]
async fn listing_orders_skips_rows_from_before_today(){
    let app = TestApp::spawn_app().await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 201);

    // Plant an order dated two days back, bypassing the API
    {
        use cafe_inn::schema::orders;

        let staff_id = user_id_of(&app, "barista");
        let mut conn = app.pool.get().unwrap();
        diesel::insert_into(orders::table)
            .values((
                orders::staff_id.eq(staff_id),
                orders::table_ids.eq(Vec::<i32>::new()),
                orders::order_status.eq("pending"),
                orders::net_price.eq(50),
                orders::created_at.eq(Utc::now() - Duration::days(2))
            ))
            .execute(&mut conn)
            .unwrap();
    }

    let response = app.api_client.get(format!("{}/orders", app.get_app_url()))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();

    let listing: Vec<OrderWithItems> = response.json().await.unwrap();
    assert_eq!(listing.len(), 1, "the backdated order must not show up");
}

#[actix_web::test]
async fn availability_guard_rejects_order_on_claimed_table(){
    let app = TestApp::spawn_app_with_availability_guard(true).await;
    let admin_token = create_admin_and_login(&app, "boss").await;
    let staff_token = create_staff_and_login(&app, "barista").await;

    let product_id = create_product(&app, &staff_token, "Latte", 50).await;
    let table_id = create_table(&app, &admin_token, "A1", 4).await;

    let response = post_order(&app, &staff_token, &serde_json::json!({
        "table_ids": [table_id],
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 201);

    // Second claim on the same (now full) table is refused up front
    let response = post_order(&app, &staff_token, &serde_json::json!({
        "table_ids": [table_id],
        "items": [{ "product_id": product_id, "quantity": 1 }]
    })).await;
    assert_eq!(response.status().as_u16(), 409);
}
