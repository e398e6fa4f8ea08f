mod common;

use api::app::build_router;
use common::*;
use serde_json::json;

#[tokio::test]
async fn registration_writes_a_confirmation_notification() {
    let state = setup_test_db().await;
    let (_user_id, token) = create_test_user(&state, false).await;
    let tournament_id = create_test_tournament(&state, "Notified Cup", "Duo").await;

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
        "/notifications",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 200);

    let notifications = body.as_array().unwrap();
    assert!(notifications
        .iter()
        .any(|n| n["title"] == "Tournament Registration Successful"
            && n["content"].as_str().unwrap().contains("Notified Cup")));
}

#[tokio::test]
async fn mark_all_read_clears_the_unread_flag() {
    let state = setup_test_db().await;
    let (user_id, token) = create_test_user(&state, false).await;

    sqlx::query(
        "INSERT INTO notifications (user_id, title, content, kind) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind("Heads up")
    .bind("Something happened")
    .bind("system")
    .execute(&state.db)
    .await
    .unwrap();

    let (status, _) = send(
        build_router(state.clone()),
        "PATCH",
        "/notifications",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send(
        build_router(state.clone()),
        "GET",
        "/notifications",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["read"] == true));
}

#[tokio::test]
async fn friend_request_flow_and_duplicate_rejection() {
    let state = setup_test_db().await;
    let (_a_id, a_token) = create_test_user(&state, false).await;
    let (b_id, b_token) = create_test_user(&state, false).await;

    let (status, body) = send(
        build_router(state.clone()),
        "POST",
        "/friends",
        Some(&a_token),
        Some(json!({ "friendId": b_id.to_string() })),
    )
    .await;
    assert_eq!(status, 201, "friend request should succeed: {body}");
    assert_eq!(body["status"], "pending");

    // Reverse-direction duplicate is also rejected.
    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/friends",
        Some(&b_token),
        Some(json!({ "friendId": body["userId"].as_str().unwrap() })),
    )
    .await;
    assert_eq!(status, 409);

    // Pending requests do not show up as friends yet.
    let (status, friends) = send(
        build_router(state.clone()),
        "GET",
        "/friends",
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert!(friends.as_array().unwrap().is_empty());

    // Accept it directly in the store; both sides should now see each other.
    sqlx::query("UPDATE friendships SET status = 'accepted' WHERE id = $1")
        .bind(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).unwrap())
        .execute(&state.db)
        .await
        .unwrap();

    let (_, friends_of_a) = send(
        build_router(state.clone()),
        "GET",
        "/friends",
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(friends_of_a.as_array().unwrap().len(), 1);
    assert_eq!(friends_of_a[0]["friend"]["id"], b_id.to_string());

    let (_, friends_of_b) = send(
        build_router(state.clone()),
        "GET",
        "/friends",
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(friends_of_b.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn befriending_yourself_is_rejected() {
    let state = setup_test_db().await;
    let (user_id, token) = create_test_user(&state, false).await;

    let (status, _) = send(
        build_router(state.clone()),
        "POST",
        "/friends",
        Some(&token),
        Some(json!({ "friendId": user_id.to_string() })),
    )
    .await;
    assert_eq!(status, 400);
}
