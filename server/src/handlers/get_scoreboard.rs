use crate::handlers::prelude::*;
use crate::scoreboard::load_scoreboards;

#[derive(Deserialize, Debug)]
pub struct ScoreboardQuery {
    pub public: Option<bool>,
}

#[get("/tournament/{tournament_id}/scoreboard")]
pub async fn get_scoreboard(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ScoreboardQuery>,
) -> HttpResult {
    let state = server_state(&req)?;
    let tournament_id = path.into_inner();
    let boards = load_scoreboards(&state.db, tournament_id, query.public.unwrap_or(true)).await?;
    Ok(HttpResponse::Ok().json(boards))
}
