use actix_web::http::StatusCode;
use actix_web::{test, App};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use mtt_db as db;
use mtt_server::config::RoundConfig;
use mtt_server::server_state::ServerState;
use mtt_server::{server, store};

#[actix_web::test]
async fn server_smoke() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .is_test(true)
        .filter_module("sqlx", log::LevelFilter::Error)
        .try_init();
    let dir = tempdir::TempDir::new("mtt-test").expect("Failed to create test dir");
    let db_url = format!(
        "sqlite://{}/db.sqlite?mode=rwc",
        dir.path().to_str().expect("Non-utf8 test dir")
    );
    let db = sea_orm::Database::connect(&db_url)
        .await
        .expect("Failed to connect to the database");
    std::env::set_var("MTT_POPULATE_DATABASE", "true");
    migration::Migrator::up(&db, None)
        .await
        .expect("Applying initial DB migrations failed");

    let round_config = RoundConfig {
        pairing_timeout: Some(std::time::Duration::from_secs(30)),
        seed: Some(2024),
    };
    let app = test::init_service(
        App::new()
            .app_data(ServerState::new(db.clone(), round_config))
            .configure(server::routes),
    )
    .await;

    // The seeded demo tournament has six teams of two and three tables.
    let req = test::TestRequest::post()
        .uri("/tournament/1/round")
        .to_request();
    let round: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(round["number"], 1);
    assert_eq!(round["success"], true);
    assert!(round["warning"].is_null());
    let matches = round["matches"].as_array().expect("matches missing");
    assert_eq!(matches.len(), 3);
    for m in matches {
        assert_eq!(m["match_type"], "Normal");
        assert!(m["table_id"].is_i64());
        let id = m["id"].as_i64().expect("match id");
        let teams = m["teams"].as_array().expect("teams");
        let a = teams[0].as_i64().expect("team id");
        let b = teams[1].as_i64().expect("team id");
        store::record_team_score(&db, id, a, Some(Decimal::new(25, 1)))
            .await
            .expect("Failed to record score");
        store::record_team_score(&db, id, b, Some(Decimal::new(5, 1)))
            .await
            .expect("Failed to record score");
    }

    let req = test::TestRequest::post()
        .uri("/tournament/1/round")
        .to_request();
    let round: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(round["number"], 2);
    assert_eq!(round["matches"].as_array().map(|m| m.len()), Some(3));

    let req = test::TestRequest::get()
        .uri("/tournament/1/scoreboard")
        .to_request();
    let boards: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let teams = boards["teams"].as_array().expect("teams missing");
    assert_eq!(teams.len(), 6);
    let winners = teams.iter().filter(|t| t["rank"] == 1).count();
    assert_eq!(winners, 3);
    assert_eq!(boards["players"].as_array().map(|p| p.len()), Some(12));

    let req = test::TestRequest::post()
        .uri("/tournament/42/round")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let broken_table = db::tables::ActiveModel {
        id: Set(1),
        priority: Set(150),
        ..Default::default()
    };
    db::prelude::Tables::update(broken_table)
        .exec(&db)
        .await
        .expect("Failed to update table");
    let req = test::TestRequest::post()
        .uri("/tournament/1/round")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The rejected round left nothing behind.
    let rounds = db::prelude::Rounds::find()
        .all(&db)
        .await
        .expect("Failed to fetch rounds");
    assert_eq!(rounds.len(), 2);
}
