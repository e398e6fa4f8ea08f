mod common;

use api::app::build_router;
use common::*;
use serde_json::json;

#[tokio::test]
async fn admin_creates_updates_and_deletes_a_tournament() {
    let state = setup_test_db().await;
    let (_admin_id, admin_token) = create_test_user(&state, true).await;

    let (status, body) = send(
        build_router(state.clone()),
        "POST",
        "/admin/tournaments",
        Some(&admin_token),
        Some(json!({
            "name": "CODM Pro League",
            "description": "Professional tournament for elite players",
            "type": "Squad",
            "prize": 5000,
            "startTime": "2026-09-15T14:00:00Z",
            "endTime": "2026-09-15T18:00:00Z",
            "maxTeams": 32,
            "status": "Registering"
        })),
    )
    .await;
    assert_eq!(status, 201, "create should succeed: {body}");
    let id = body["tournament"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["tournament"]["gameType"], "Squad");
    assert_eq!(body["tournament"]["status"], "Registering");

    // Any status may be set to any other; there is no transition table.
    let (status, body) = send(
        build_router(state.clone()),
        "PATCH",
        &format!("/admin/tournaments/{id}"),
        Some(&admin_token),
        Some(json!({ "status": "Last Call", "prize": 6000 })),
    )
    .await;
    assert_eq!(status, 200, "update should succeed: {body}");
    assert_eq!(body["tournament"]["status"], "Last Call");
    assert_eq!(body["tournament"]["prize"], 6000);

    let (status, body) = send(
        build_router(state.clone()),
        "GET",
        &format!("/admin/tournaments/{id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "Last Call");

    let (status, _) = send(
        build_router(state.clone()),
        "DELETE",
        &format!("/admin/tournaments/{id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = send(
        build_router(state.clone()),
        "GET",
        &format!("/tournaments/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn tournament_validation_rejects_bad_fields() {
    let state = setup_test_db().await;
    let (_admin_id, admin_token) = create_test_user(&state, true).await;

    let valid = json!({
        "name": "Cup",
        "type": "Duo",
        "prize": 1000,
        "startTime": "2026-09-20T14:00:00Z",
        "maxTeams": 8
    });

    for (field, value) in [
        ("name", json!("ab")),
        ("prize", json!(-1)),
        ("maxTeams", json!(1)),
        ("startTime", json!("not-a-date")),
    ] {
        let mut body = valid.clone();
        body[field] = value;
        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            "/admin/tournaments",
            Some(&admin_token),
            Some(body),
        )
        .await;
        assert_eq!(status, 400, "{field} should fail validation");
    }

    // Unknown enum values are rejected at deserialization.
    let mut body = valid.clone();
    body["type"] = json!("Trio");
    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/admin/tournaments",
        Some(&admin_token),
        Some(body),
    )
    .await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn admin_routes_distinguish_unauthenticated_from_forbidden() {
    let state = setup_test_db().await;
    let (_player_id, player_token) = create_test_user(&state, false).await;

    let payload = json!({
        "name": "Gated Cup",
        "type": "Solo",
        "prize": 100,
        "startTime": "2026-10-01T14:00:00Z",
        "maxTeams": 4
    });

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/admin/tournaments",
        None,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, 401, "no identity at all");

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/admin/tournaments",
        Some(&player_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, 403, "authenticated but not an admin");
}

#[tokio::test]
async fn demoted_admin_loses_access_despite_valid_token() {
    let state = setup_test_db().await;
    let (admin_id, admin_token) = create_test_user(&state, true).await;

    sqlx::query("UPDATE users SET is_admin = FALSE WHERE id = $1")
        .bind(admin_id)
        .execute(&state.db)
        .await
        .unwrap();

    // The token still claims is_admin; the gate re-reads the row.
    let (status, _) = send(
        build_router(state.clone()),
        "GET",
        "/admin/tournaments",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn public_listing_includes_counts_and_filters() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Counted Cup", "Duo").await;

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(json!({ "tournamentId": tournament_id.to_string() })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send(
        build_router(state.clone()),
        "GET",
        "/tournaments?type=Duo",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);

    let tournaments = body["tournaments"].as_array().unwrap();
    let ours = tournaments
        .iter()
        .find(|t| t["id"] == tournament_id.to_string())
        .expect("tournament should appear in the Duo listing");
    assert_eq!(ours["registrationCount"], 1);
    assert_eq!(ours["teamCount"], 1);
    assert!(tournaments.iter().all(|t| t["gameType"] == "Duo"));
}

#[tokio::test]
async fn public_detail_nests_teams_without_room_codes() {
    let state = setup_test_db().await;
    let (user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Nested Cup", "Squad").await;

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/tournaments/register",
        Some(&token),
        Some(json!({
            "tournamentId": tournament_id.to_string(),
            "teamName": "The Nest",
            "teammates": [{"name": "Scout", "uid": "CODM-1"}]
        })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send(
        build_router(state.clone()),
        "GET",
        &format!("/tournaments/{tournament_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["registrationCount"], 1);

    let teams = body["teams"].as_array().unwrap();
    assert_eq!(teams.len(), 1);
    let team = &teams[0];
    assert_eq!(team["name"], "The Nest");
    assert_eq!(team["leader"]["id"], user_id.to_string());
    assert_eq!(team["registrations"].as_array().unwrap().len(), 1);
    // Shown once at registration, never on a read path.
    assert!(team.get("roomCode").is_none());
}
