mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

const FUNCTION_URI: &str = "/functions/v1/evaluate-activity";

#[tokio::test]
async fn evaluating_twice_through_the_form_keeps_one_row() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Hike", "2020-04-04").await;
    let uri = format!("/activities/{}/evaluate", activity);

    let page = app.get(&uri, Some(STUDENT)).await;
    assert_eq!(page.status(), StatusCode::OK);

    let first = app.post_form(&uri, Some(STUDENT), "rating=4&comment=Great").await;
    assert_eq!(location(&first), "/activities?notice=evaluated");

    let second = app.post_form(&uri, Some(STUDENT), "rating=2").await;
    assert_eq!(location(&second), "/activities?notice=already_evaluated");

    let again = app.get(&uri, Some(STUDENT)).await;
    assert_eq!(location(&again), "/activities?notice=already_evaluated");

    let count = count_for_pair(&app.pool, "activity_evaluations", &activity, STUDENT).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn out_of_range_rating_rerenders_the_form() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Hike", "2020-04-04").await;
    let resp = app
        .post_form(&format!("/activities/{}/evaluate", activity), Some(STUDENT), "rating=9")
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("rating must be between 1 and 5"));
}

#[tokio::test]
async fn function_reports_duplicate_with_fixed_message() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Museum visit", "2020-02-02").await;
    let payload = json!({
        "activity_id": activity,
        "student_id": STUDENT,
        "rating": 5,
        "comment": "Loved it",
    });

    let first = app.post_json(FUNCTION_URI, Some(STUDENT), payload.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await, json!({ "success": true }));

    let second = app.post_json(FUNCTION_URI, Some(STUDENT), payload).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(second).await,
        json!({ "error": "You have already evaluated this activity" })
    );

    let count = count_for_pair(&app.pool, "activity_evaluations", &activity, STUDENT).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn function_rejects_anonymous_and_impersonating_callers() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Museum visit", "2020-02-02").await;
    let payload = json!({ "activity_id": activity, "student_id": STUDENT, "rating": 3 });

    let anonymous = app.post_json(FUNCTION_URI, None, payload.clone()).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let other = app.post_json(FUNCTION_URI, Some(OTHER_STUDENT), payload).await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let bad_rating = app
        .post_json(
            FUNCTION_URI,
            Some(STUDENT),
            json!({ "activity_id": activity, "student_id": STUDENT, "rating": 0 }),
        )
        .await;
    assert_eq!(bad_rating.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .post_json(
            FUNCTION_URI,
            Some(STUDENT),
            json!({ "activity_id": "nope", "student_id": STUDENT, "rating": 3 }),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn function_refuses_callers_who_are_not_students() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Museum visit", "2020-02-02").await;

    for caller in [TEACHER, NO_ROLE] {
        let payload = json!({ "activity_id": activity, "student_id": caller, "rating": 5 });
        let resp = app.post_json(FUNCTION_URI, Some(caller), payload).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", caller);
        assert_eq!(
            body_json(resp).await,
            json!({ "error": "Only students can evaluate activities" })
        );
        assert_eq!(
            count_for_pair(&app.pool, "activity_evaluations", &activity, caller).await,
            0
        );
    }

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(FUNCTION_URI)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .header(axum::http::header::COOKIE, session_cookie(TEACHER))
        .body(axum::body::Body::from(
            json!({ "activity_id": activity, "student_id": TEACHER, "rating": 4 }).to_string(),
        ))
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::FORBIDDEN);
}
