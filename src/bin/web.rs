//! Single binary web server for the team tournament API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Optional startup data: LEAGUE_SEED (JSON), LEAGUE_PLAYERS_CSV (name,gender[,id]).

use actix_web::{web::Data, App, HttpServer};
use pickleball_tournament_web::api;
use pickleball_tournament_web::config::Config;
use pickleball_tournament_web::seed::{load_players_csv, LeagueSeed};
use pickleball_tournament_web::LeagueStore;
use std::sync::RwLock;

fn load_store(config: &Config) -> LeagueStore {
    let mut store = LeagueStore::new();
    if let Some(path) = &config.seed_path {
        match LeagueSeed::from_path(path).and_then(|seed| seed.load_into(&mut store)) {
            Ok(()) => log::info!("Loaded seed data from {}", path.display()),
            Err(e) => log::error!("Could not load seed data from {}: {}", path.display(), e),
        }
    }
    if let Some(path) = &config.players_csv {
        match load_players_csv(path, &mut store) {
            Ok(count) => log::info!("Imported {} players from {}", count, path.display()),
            Err(e) => log::error!("Could not import players from {}: {}", path.display(), e),
        }
    }
    store
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_environment();
    let state = Data::new(RwLock::new(load_store(&config)));

    let (host, port) = config.bind();
    log::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind((host, port))?
        .run()
        .await
}
