use crate::handlers::prelude::*;
use crate::round_builder;
use crate::store::CreatedRound;

#[derive(Serialize)]
struct CreateRoundResponse {
    #[serde(flatten)]
    round: CreatedRound,
    warning: Option<String>,
}

#[post("/tournament/{tournament_id}/round")]
pub async fn post_create_round(req: HttpRequest, path: web::Path<i64>) -> HttpResult {
    let state = server_state(&req)?;
    let tournament_id = path.into_inner();
    let config = &state.round_config;
    let round = round_builder::create_round(
        &state.db,
        &state.locks,
        tournament_id,
        config,
        round_builder::rng(config),
    )
    .await?;
    let warning = (!round.success).then(|| {
        format!(
            "Not all teams could be paired; unpaired teams: {:?}",
            round.unpaired
        )
    });
    Ok(HttpResponse::Ok().json(CreateRoundResponse { round, warning }))
}
