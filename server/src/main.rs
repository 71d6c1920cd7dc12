use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;

use drawit_server::config::ServerConfig;
use drawit_server::handlers::{root, static_files};
use drawit_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    if !config.static_dir.is_dir() {
        log::warn!(
            "Static directory {} does not exist",
            config.static_dir.display()
        );
    }

    let srv_tx = spawn_server(config.quorum);
    let static_dir = config.static_dir.clone();

    log::info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .wrap(middleware::Logger::default())
            .configure(root)
            .service(static_files(&static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
