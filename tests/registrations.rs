mod common;

use axum::http::StatusCode;

use activity_board::database::registrations_repo;
use common::*;

#[tokio::test]
async fn second_registration_is_reported_as_duplicate() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Chess club", "2099-05-01").await;
    let uri = format!("/activities/{}/register", activity);

    let first = app.post_form(&uri, Some(STUDENT), "").await;
    assert_eq!(location(&first), "/activities?notice=registered");

    let second = app.post_form(&uri, Some(STUDENT), "").await;
    assert_eq!(location(&second), "/activities?notice=already_registered");

    let count = count_for_pair(&app.pool, "student_registrations", &activity, STUDENT).await;
    assert_eq!(count, 1);

    let page = app
        .get("/activities?notice=already_registered", Some(STUDENT))
        .await;
    let html = body_text(page).await;
    assert!(html.contains("already registered"));
}

#[tokio::test]
async fn registering_for_a_missing_activity_is_not_found() {
    let app = spawn_app().await;
    let resp = app
        .post_form("/activities/does-not-exist/register", Some(STUDENT), "")
        .await;
    assert_eq!(location(&resp), "/activities?notice=not_found");
}

#[tokio::test]
async fn students_cancel_only_their_own_pending_registrations() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Robotics", "2099-06-01").await;
    app.post_form(&format!("/activities/{}/register", activity), Some(STUDENT), "")
        .await;
    let mine = registrations_repo::list_for_student(&app.pool, STUDENT)
        .await
        .unwrap();
    let registration_id = mine[0].id.clone();
    let cancel_uri = format!("/registrations/{}/cancel", registration_id);

    let resp = app.post_form(&cancel_uri, Some(OTHER_STUDENT), "").await;
    assert_eq!(location(&resp), "/registrations?notice=forbidden");

    let resp = app.post_form(&cancel_uri, Some(STUDENT), "").await;
    assert_eq!(location(&resp), "/registrations?notice=registration_cancelled");
    assert!(registrations_repo::load_registration(&app.pool, &registration_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn only_the_owner_changes_registration_status() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Choir", "2099-07-01").await;
    app.post_form(&format!("/activities/{}/register", activity), Some(STUDENT), "")
        .await;
    let registration_id = registrations_repo::list_for_student(&app.pool, STUDENT)
        .await
        .unwrap()[0]
        .id
        .clone();
    let uri = format!("/activities/{}/registrations/{}", activity, registration_id);

    let resp = app.post_form(&uri, Some(OTHER_TEACHER), "status=approved").await;
    assert!(location(&resp).ends_with("notice=forbidden"));

    let resp = app.post_form(&uri, Some(TEACHER), "status=approved").await;
    assert!(location(&resp).ends_with("notice=registration_status_updated"));
    let row = registrations_repo::load_registration(&app.pool, &registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "approved");

    // Approved registrations can no longer be cancelled by the student.
    let resp = app
        .post_form(&format!("/registrations/{}/cancel", registration_id), Some(STUDENT), "")
        .await;
    assert_eq!(location(&resp), "/registrations?notice=forbidden");

    let page = app
        .get(&format!("/activities/{}/registrations", activity), Some(TEACHER))
        .await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("Sam Student"));
}

#[tokio::test]
async fn grades_are_saved_for_registered_students_only() {
    let app = spawn_app().await;
    let activity = seed_activity(&app.pool, TEACHER, "Debate", "2020-01-10").await;
    app.post_form(&format!("/activities/{}/register", activity), Some(STUDENT), "")
        .await;

    let resp = app
        .post_form(
            &format!("/activities/{}/grades/{}", activity, STUDENT),
            Some(TEACHER),
            "score=8&feedback=Well+argued",
        )
        .await;
    assert!(location(&resp).ends_with("notice=grade_saved"));

    let resp = app
        .post_form(
            &format!("/activities/{}/grades/{}", activity, OTHER_STUDENT),
            Some(TEACHER),
            "score=8",
        )
        .await;
    assert!(location(&resp).ends_with("notice=not_found"));

    let students = app.get("/students?q=sam", Some(TEACHER)).await;
    let html = body_text(students).await;
    assert!(html.contains("Sam Student"));
    assert!(html.contains("8.0"));
    assert!(!html.contains("Sue Student"));
}

#[tokio::test]
async fn student_search_wildcards_match_literally() {
    let app = spawn_app().await;
    let html = body_text(app.get("/students?q=%25", Some(TEACHER)).await).await;
    assert!(!html.contains("Sam Student"));
    assert!(!html.contains("Sue Student"));

    let html = body_text(app.get("/students?q=s_e", Some(TEACHER)).await).await;
    assert!(!html.contains("Sue Student"));
}

#[tokio::test]
async fn reports_accept_out_of_range_years() {
    let app = spawn_app().await;
    for uri in [
        "/reports?kind=year&year=-2147483648",
        "/reports?kind=period&period=1&year=-2147483648",
        "/reports?kind=year&year=2147483647",
    ] {
        let resp = app.get(uri, Some(TEACHER)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    }
}
