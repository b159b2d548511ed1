use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpResponse, HttpServer};
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::Pool;
use tracing_actix_web::TracingLogger;

use crate::auth::jwt::Tokenizer;
use crate::configuration::Settings;
use crate::routes::authentication::{login, register};
use crate::routes::health_check;
use crate::routes::orders::{list_orders, patch_order, post_order, read_order};
use crate::routes::products::{list_products, post_product, put_product, read_product, remove_product};
use crate::routes::profile::{get_profile, put_profile};
use crate::routes::reservations::{list_reservations, my_reservation, patch_reservation, post_reservation, read_reservation};
use crate::routes::tables::{list_tables, post_table, put_table, read_table, remove_table};
use crate::routes::users::{list_users, read_user};
use crate::utils::DbPool;

pub struct Application{
    pub host: String,
    pub port: u16,
    pub server: Server
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Self, anyhow::Error>{
        let pool: DbPool = Pool::new(
            ConnectionManager::<PgConnection>::new(settings.database.get_database_table_url())
        )?;

        let tokenizer = Tokenizer::new(&settings.jwt);

        let listener = TcpListener::bind((settings.application.host.as_str(), settings.application.port))?;
        let port = listener.local_addr()?.port();
        let host = settings.application.host.clone();

        let pool_data = web::Data::new(pool);
        let tokenizer_data = web::Data::new(tokenizer);
        let application_settings = web::Data::new(settings.application);

        let server = HttpServer::new(move || {
            // Requests that don't deserialize (including unknown status
            // labels of the closed enums) are validation failures
            let json_config = web::JsonConfig::default()
                .error_handler(|err, _req| {
                    let message = err.to_string();
                    actix_web::error::InternalError::from_response(
                        err,
                        HttpResponse::UnprocessableEntity().body(message)
                    )
                    .into()
                });

            App::new()
                .wrap(TracingLogger::default())
                .app_data(json_config)
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(register))
                        .route("/login", web::post().to(login))
                )
                .service(
                    web::scope("/products")
                        .route("", web::get().to(list_products))
                        .route("", web::post().to(post_product))
                        .route("/{product_id}", web::get().to(read_product))
                        .route("/{product_id}", web::put().to(put_product))
                        .route("/{product_id}", web::delete().to(remove_product))
                )
                .service(
                    web::scope("/tables")
                        .route("", web::get().to(list_tables))
                        .route("", web::post().to(post_table))
                        .route("/{table_id}", web::get().to(read_table))
                        .route("/{table_id}", web::put().to(put_table))
                        .route("/{table_id}", web::delete().to(remove_table))
                )
                .service(
                    web::scope("/orders")
                        .route("", web::get().to(list_orders))
                        .route("", web::post().to(post_order))
                        .route("/{order_id}", web::get().to(read_order))
                        .route("/{order_id}", web::patch().to(patch_order))
                )
                .service(
                    web::scope("/reservations")
                        // "/me" has to be registered ahead of the id match
                        .route("/me", web::get().to(my_reservation))
                        .route("", web::get().to(list_reservations))
                        .route("", web::post().to(post_reservation))
                        .route("/{reservation_id}", web::get().to(read_reservation))
                        .route("/{reservation_id}", web::patch().to(patch_reservation))
                )
                .service(
                    web::scope("/users")
                        .route("/me", web::get().to(get_profile))
                        .route("/me", web::put().to(put_profile))
                        .route("", web::get().to(list_users))
                        .route("/{user_id}", web::get().to(read_user))
                )
                .app_data(pool_data.clone())
                .app_data(tokenizer_data.clone())
                .app_data(application_settings.clone())
        })
        .listen(listener)?
        .run();

        Ok(Application{ host, port, server })
    }
}
