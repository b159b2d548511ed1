use std::error::Error;

use cafe_inn::{configuration::{DatabaseSettings, Settings}, routes::authentication::login::TokenResponse, startup::Application, telemetry::{get_subscriber, init_subscriber}, utils::DbPool};
use diesel::{pg::Pg, r2d2::ConnectionManager, Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use fake::{faker::internet::en::Username, Fake};
use once_cell::sync::Lazy;
use r2d2::Pool;
use rand::Rng;
use uuid::Uuid;

static LOGGER_INSTANCE: Lazy<()> = Lazy::new(|| {
    let log_level = "info".to_string();
    let name = "cafe-inn-test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, log_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, log_level, std::io::sink);
        init_subscriber(subscriber);
    }

    ()
});

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

fn run_migrations(connection: &mut impl MigrationHarness<Pg>)
    -> Result<(), Box<dyn Error + Send + Sync + 'static>>
{
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

pub struct TestApp{
    pub host: String,
    pub port: u16,
    pub pool: DbPool,
    pub api_client: reqwest::Client
}

impl TestApp {
    fn create_db(settings: &DatabaseSettings) -> DbPool{
        let mut connection = PgConnection::establish(&settings.get_database_url())
                                .expect("Failed to connect to postgres database");

        let query = format!(r#"CREATE DATABASE "{}";"#, settings.name);
        diesel::sql_query(query)
            .execute(&mut connection)
            .expect("Failed to create test database");

        let pool = Pool::new(ConnectionManager::<PgConnection>::new(settings.get_database_table_url()))
            .expect("Failed to build connection pool to test database");

        let mut conn = pool.get().expect("Failed to get connection to test database");
        run_migrations(&mut conn).expect("Failed to run migrations");

        pool
    }

    pub fn get_app_url(&self) -> String{
        format!("http://{}:{}", self.host, self.port)
    }

    pub async fn spawn_app() -> TestApp{
        TestApp::spawn_app_with_availability_guard(false).await
    }

    pub async fn spawn_app_with_availability_guard(enforce: bool) -> TestApp{
        Lazy::force(&LOGGER_INSTANCE);

        let mut settings = Settings::get();
        settings.application.port = 0;
        settings.application.enforce_table_availability = enforce;
        settings.database.name = Uuid::new_v4().to_string();

        let pool = TestApp::create_db(&settings.database);

        let application = Application::new(settings)
                            .await
                            .expect("Failed to build application");

        tokio::task::spawn(application.server);

        let api_client = reqwest::Client::builder()
                            .build()
                            .unwrap();

        return TestApp{
            host: application.host,
            port: application.port,
            pool,
            api_client
        }
    }
}

// A username the registration endpoint will accept
pub fn random_username() -> String{
    let base: String = Username().fake();
    format!("{}{}", base, rand::thread_rng().gen_range(100..999))
}

pub async fn register_user(app: &TestApp, username: &str, password: &str) -> reqwest::Response{
    app.api_client.post(format!("{}/auth/register", app.get_app_url()))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request to register endpoint")
}

pub async fn login_user(app: &TestApp, username: &str, password: &str) -> String{
    let response = app.api_client.post(format!("{}/auth/login", app.get_app_url()))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request to login endpoint");

    assert_eq!(response.status().as_u16(), 200);

    let body: TokenResponse = response.json().await.unwrap();
    body.access_token
}

pub async fn create_user_and_login(app: &TestApp, username: &str) -> String{
    let response = register_user(app, username, "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    login_user(app, username, "test1234").await
}

fn promote_user(app: &TestApp, username: &str, role: &str){
    use cafe_inn::schema::users;

    let mut conn = app.pool.get().unwrap();
    diesel::update(users::table.filter(users::username.eq(username)))
        .set(users::user_role.eq(role))
        .execute(&mut conn)
        .expect("Failed to promote test user");
}

// Registers a user, flips its role directly in the database, then logs in
// so the issued token carries the elevated role.
pub async fn create_staff_and_login(app: &TestApp, username: &str) -> String{
    let response = register_user(app, username, "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    promote_user(app, username, "staff");
    login_user(app, username, "test1234").await
}

pub async fn create_admin_and_login(app: &TestApp, username: &str) -> String{
    let response = register_user(app, username, "test1234").await;
    assert_eq!(response.status().as_u16(), 201);

    promote_user(app, username, "admin");
    login_user(app, username, "test1234").await
}

pub async fn create_table(app: &TestApp, admin_token: &str, table_number: &str, capacity: i32) -> i32{
    let response = app.api_client.post(format!("{}/tables", app.get_app_url()))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "table_number": table_number,
            "capacity": capacity
        }))
        .send()
        .await
        .expect("Failed to send request to tables endpoint");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["table_id"].as_i64().unwrap() as i32
}

pub async fn create_product(app: &TestApp, staff_token: &str, product_name: &str, price: i32) -> i32{
    let response = app.api_client.post(format!("{}/products", app.get_app_url()))
        .bearer_auth(staff_token)
        .json(&serde_json::json!({
            "product_name": product_name,
            "price": price,
            "sweetness_options": ["0%", "50%", "100%"],
            "milk_type_options": ["fresh", "oat"]
        }))
        .send()
        .await
        .expect("Failed to send request to products endpoint");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["product_id"].as_i64().unwrap() as i32
}

pub fn table_status(app: &TestApp, table_id: i32) -> String{
    use cafe_inn::schema::tables;

    let mut conn = app.pool.get().unwrap();
    tables::table
        .filter(tables::table_id.eq(table_id))
        .select(tables::status)
        .get_result::<String>(&mut conn)
        .expect("Failed to read table status")
}

pub fn user_id_of(app: &TestApp, username: &str) -> i32{
    use cafe_inn::schema::users;

    let mut conn = app.pool.get().unwrap();
    users::table
        .filter(users::username.eq(username))
        .select(users::user_id)
        .get_result::<i32>(&mut conn)
        .expect("Failed to read user id")
}

pub fn password_hash_of(app: &TestApp, username: &str) -> String{
    use cafe_inn::schema::users;

    let mut conn = app.pool.get().unwrap();
    users::table
        .filter(users::username.eq(username))
        .select(users::password)
        .get_result::<String>(&mut conn)
        .expect("Failed to read password hash")
}
