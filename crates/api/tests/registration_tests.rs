mod common;

use api::app::build_router;
use common::*;
use infra::models::Teammate;
use infra::repos::RegistrationRepo;
use serde_json::json;

#[tokio::test]
async fn register_creates_team_registration_and_room_code() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Cup", "Duo").await;

    let (status, body) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(json!({
            "tournamentId": tournament_id.to_string(),
            "teammates": [{"name": "Wingman", "uid": "CODM-778"}]
        })),
    )
    .await;

    assert_eq!(status, 200, "registration should succeed: {body}");

    let registration = &body["registration"];
    assert_eq!(registration["role"], "Team Leader");
    assert_eq!(registration["status"], "Registered");
    assert_eq!(registration["tournamentId"], tournament_id.to_string());

    let teammates = body["team"]["teammates"].as_array().unwrap();
    assert_eq!(teammates.len(), 1);
    assert_eq!(teammates[0]["name"], "Wingman");

    let room_code = body["roomCode"].as_str().unwrap();
    assert_room_code(room_code);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Conflict Cup", "Squad").await;

    let payload = json!({ "tournamentId": tournament_id.to_string() });

    let (first, _) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(first, 200);

    let (second, body) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(payload),
    )
    .await;
    assert_eq!(second, 409);
    assert_eq!(body["error"], "already registered for this tournament");
}

#[tokio::test]
async fn concurrent_duplicate_registrations_leave_one_row() {
    let state = setup_test_db().await;
    let (user_id, _token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Race Cup", "Duo").await;

    let repo_a = RegistrationRepo::new(state.db.clone());
    let repo_b = RegistrationRepo::new(state.db.clone());

    let teammates: Vec<Teammate> = Vec::new();
    let (a, b) = tokio::join!(
        repo_a.register_team(user_id, tournament_id, "Alpha".into(), teammates.clone()),
        repo_b.register_team(user_id, tournament_id, "Bravo".into(), teammates),
    );

    assert!(
        a.is_ok() != b.is_ok(),
        "exactly one of the concurrent registrations should win"
    );

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM registrations WHERE user_id = $1 AND tournament_id = $2",
    )
    .bind(user_id)
    .bind(tournament_id)
    .fetch_one(&state.db)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unregister_then_reregister_issues_a_fresh_code() {
    let state = setup_test_db().await;
    let (user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Rematch Cup", "Duo").await;

    let payload = json!({ "tournamentId": tournament_id.to_string() });

    let (status, first) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, 200);
    assert_room_code(first["roomCode"].as_str().unwrap());

    let (status, _) = send(
        build_router(state.clone()),
        "DELETE",
        &format!("/tournaments/{tournament_id}/register"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 200);

    // The anchored team went with the registration.
    let teams: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM teams WHERE leader_id = $1 AND tournament_id = $2",
    )
    .bind(user_id)
    .bind(tournament_id)
    .fetch_one(&state.db)
    .await
    .unwrap();
    assert_eq!(teams, 0);

    let (status, second) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(payload),
    )
    .await;
    assert_eq!(status, 200, "re-registration should succeed: {second}");
    assert_room_code(second["roomCode"].as_str().unwrap());
}

#[tokio::test]
async fn unregister_without_registration_is_not_found() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Empty Cup", "Solo").await;

    let (status, _) = send(
        build_router(state.clone()),
        "DELETE",
        &format!("/tournaments/{tournament_id}/register"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn register_requires_authentication() {
    let state = setup_test_db().await;
    let tournament_id = create_test_tournament(&state, "Locked Cup", "Duo").await;

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        None,
        Some(json!({ "tournamentId": tournament_id.to_string() })),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn register_against_unknown_tournament_is_not_found() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(json!({ "tournamentId": uuid::Uuid::new_v4().to_string() })),
    )
    .await;
    assert_eq!(status, 404);
}

fn assert_room_code(code: &str) {
    let parts: Vec<&str> = code.split('-').collect();
    assert_eq!(parts.len(), 3, "room code {code} should be CLUTCH-####-VAULT");
    assert_eq!(parts[0], "CLUTCH");
    assert_eq!(parts[2], "VAULT");
    assert_eq!(parts[1].len(), 4);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
}
