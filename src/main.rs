mod auth;
mod config;
mod db;
mod filters;
mod models;
mod notify;
mod render;
mod repo;
mod routes;
mod state;
mod storage;
mod submit;
mod templates;
#[cfg(test)]
mod testing;
mod validate;
mod workflow;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};

use crate::{
    auth::AdminCredentials, config::AppConfig, notify::Mailer, state::AppState, storage::Storage,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let pool = db::connect(&config.database_url).await?;

    let admin = AdminCredentials::new(&config.admin_user, &config.admin_password)
        .map_err(|err| format!("admin password hash failed: {err}"))?;
    let mailer = Mailer::new(config.email.clone())?;
    let state = AppState::new(Storage::new(pool), mailer, admin);

    let address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting clinic-desk on http://{address}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "./static").prefer_utf8(true))
            .configure(routes::public::configure)
            .configure(routes::admin::configure)
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
