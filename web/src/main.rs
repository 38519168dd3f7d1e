#![warn(clippy::all)]

use std::io;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use db::seed::initialize_data;
use db::{
    build_pool, establish_connection, run_migrations, AliasTable, PassageAssembler, SwordDrill,
};

use crate::config::Config;

/// Represents the [server data](actix_web::web::Data) for the application.
pub struct ServerData<S> {
    pub drill: S,
    pub assembler: PassageAssembler,
}

/// CORS policy: any origin, the usual API methods and headers.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers(vec![header::LINK])
        .supports_credentials()
        .max_age(300)
}

fn to_io(e: impl ToString) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Prepares the database and the shared server data.
fn setup(config: &Config) -> Result<ServerData<SwordDrill>, io::Error> {
    // Run DB migrations (and seed) before any pooled connection exists
    let mut conn = establish_connection(&config.database_url).map_err(to_io)?;
    run_migrations(&mut conn).map_err(to_io)?;
    if config.seed_on_start {
        initialize_data(&mut conn, config.chapters_dir.as_deref()).map_err(to_io)?;
    }

    let pool = build_pool(&config.database_url, config.pool_size).map_err(to_io)?;

    Ok(ServerData {
        drill: SwordDrill::new(pool),
        assembler: PassageAssembler::new(
            AliasTable::default(),
            &config.default_translation,
            config.text_join,
        ),
    })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    // Set up logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        to_io(e)
    })?;

    let data = web::Data::new(setup(&config).map_err(|e| {
        error!("{}", e);
        e
    })?);

    info!(
        "Scripture API starting on {} (database {})",
        config.bind_address, config.database_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors())
            .app_data(data.clone())
            .configure(controllers::configure::<SwordDrill>)
    })
    .workers(config.workers)
    .bind(&config.bind_address)?
    .run()
    .await?;

    info!("Server exited");
    Ok(())
}

mod config;
mod controllers;
mod error;
mod responder;
