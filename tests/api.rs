//! HTTP tests for the REST API.

mod common;

use actix_web::{http::StatusCode, test, web::Data, App};
use common::{League, ReadyMatch};
use pickleball_tournament_web::api;
use pickleball_tournament_web::{GameSlot, Gender, LeagueStore};
use serde_json::{json, Value};
use std::sync::RwLock;

fn state(store: LeagueStore) -> Data<RwLock<LeagueStore>> {
    Data::new(RwLock::new(store))
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test::init_service(
        App::new()
            .app_data(state(LeagueStore::new()))
            .configure(api::configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], true);
}

#[actix_web::test]
async fn roster_put_reports_cap_errors_as_bad_request() {
    let mut league = League::new(Some(2));
    let bracket = league.bracket("Advanced");
    let team = league.team(bracket, "Dink Dynasty");
    let players = league.players("P", Gender::Male, 3);
    let stop = league.stop_a;
    let app = test::init_service(
        App::new()
            .app_data(state(league.store))
            .configure(api::configure),
    )
    .await;

    let uri = format!("/api/stops/{stop}/teams/{team}/roster");
    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "playerIds": players }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Bracket exceeds its limit for this stop (3/2)"
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "playerIds": &players[..2] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["uniqueAcrossStops"], 2);
    assert_eq!(body["cap"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/teams/{team}/unique-count"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 2);
}

#[actix_web::test]
async fn schedule_generate_then_conflict_then_read() {
    let mut league = League::new(None);
    let bracket = league.bracket("Advanced");
    for name in ["Alpha", "Bravo", "Charlie"] {
        league.team(bracket, name);
    }
    let stop = league.stop_a;
    let app = test::init_service(
        App::new()
            .app_data(state(league.store))
            .configure(api::configure),
    )
    .await;
    let uri = format!("/api/stops/{stop}/schedule");

    let req = test::TestRequest::post().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["roundsCreated"], 3);
    assert_eq!(body["byesCreated"], 3);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "overwrite": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("{uri}?bracketId={bracket}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rounds = body["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 3);
    let first = &rounds[0]["brackets"][0];
    assert_eq!(first["bracketName"], "Advanced");
    let matches = first["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    let real = matches.iter().find(|m| m["isBye"] == false).unwrap();
    assert_eq!(real["games"].as_array().unwrap().len(), 4);
    assert_eq!(real["games"][0]["isComplete"], false);
    assert_eq!(real["games"][0]["status"], "NOT_STARTED");
}

#[actix_web::test]
async fn game_patch_and_outcome() {
    let ready = ReadyMatch::new();
    let game = ready.game(GameSlot::MensDoubles);
    let match_id = ready.match_id;
    let app = test::init_service(
        App::new()
            .app_data(state(ready.league.store))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/games/{game}"))
        .set_json(json!({
            "startedAt": "2026-05-01T10:00:00Z",
            "teamAScore": 11,
            "teamBScore": 11,
            "isComplete": true,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/games/{game}"))
        .set_json(json!({
            "startedAt": "2026-05-01T10:00:00Z",
            "teamAScore": 11,
            "teamBScore": 7,
            "isComplete": true,
            "endedAt": "2026-05-01T10:25:00Z",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["game"]["isComplete"], true);
    assert_eq!(body["game"]["endedAt"], "2026-05-01T10:25:00Z");
    assert_eq!(body["tiebreaker"]["outcome"], "NOT_READY");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/games/{game}"))
        .set_json(json!({ "isComplete": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/matches/{match_id}/outcome"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["winsA"], 1);
    assert_eq!(body["pointsA"], 11);

    let req = test::TestRequest::post()
        .uri(&format!("/api/matches/{match_id}/tiebreaker"))
        .set_json(json!({ "createTiebreaker": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn split_match_can_be_decided_on_points() {
    let mut ready = ReadyMatch::new();
    let match_id = ready.match_id;
    let team_b = ready.league.store.get_match(match_id).unwrap().team_b.unwrap();
    for (slot, a, b) in [
        (GameSlot::MensDoubles, 11, 9),
        (GameSlot::WomensDoubles, 9, 11),
        (GameSlot::Mixed1, 11, 8),
        (GameSlot::Mixed2, 7, 11),
    ] {
        ready.play(slot, a, b);
    }
    let app = test::init_service(
        App::new()
            .app_data(state(ready.league.store))
            .configure(api::configure),
    )
    .await;
    let uri = format!("/api/matches/{match_id}/decision");

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "decideByPoints": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "decideByPoints": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["decidedBy"], "POINTS");
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["winner"], team_b.to_string());
    assert_eq!(body["pointsB"], 39);
}

#[actix_web::test]
async fn unknown_ids_are_not_found() {
    let app = test::init_service(
        App::new()
            .app_data(state(LeagueStore::new()))
            .configure(api::configure),
    )
    .await;
    let id = uuid::Uuid::new_v4();
    for uri in [
        format!("/api/matches/{id}/outcome"),
        format!("/api/stops/{id}/schedule"),
        format!("/api/teams/{id}/unique-count"),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
