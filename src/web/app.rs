use axum::{
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, get_service, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::web::middleware::auth::resolve_session;
use crate::web::middleware::guard::{require_access, RouteAccess, LOGIN_PATH};
use crate::web::routes::{
    activities, activity, auth, dashboard, functions, grades, profile, registrations, reports,
    students,
};
use crate::web::state::AppState;

fn guarded(router: Router<AppState>, access: RouteAccess) -> Router<AppState> {
    router.route_layer(from_fn_with_state(access, require_access))
}

pub fn build_router(state: AppState) -> Router {
    let any_user = Router::new().route("/dashboard", get(dashboard::dashboard_handler));

    let members = Router::new()
        .route("/activities", get(activities::activities_handler))
        .route(
            "/profile",
            get(profile::profile_page).post(profile::update_profile_handler),
        );

    let teachers = Router::new()
        .route("/activities", post(activities::create_activity_handler))
        .route("/activities/new", get(activities::new_activity_page))
        .route("/activities/:activity_id", post(activities::update_activity_handler))
        .route(
            "/activities/:activity_id/edit",
            get(activities::edit_activity_page),
        )
        .route(
            "/activities/:activity_id/delete",
            post(activities::delete_activity_handler),
        )
        .route(
            "/activities/:activity_id/registrations",
            get(registrations::activity_registrations_handler),
        )
        .route(
            "/activities/:activity_id/registrations/:registration_id",
            post(registrations::registration_status_handler),
        )
        .route("/activities/:activity_id/grades", get(grades::grades_handler))
        .route(
            "/activities/:activity_id/grades/:student_id",
            post(grades::save_grade_handler),
        )
        .route("/students", get(students::students_handler))
        .route("/reports", get(reports::reports_handler));

    let students = Router::new()
        .route(
            "/activities/:activity_id/register",
            post(activity::register_handler),
        )
        .route(
            "/activities/:activity_id/evaluate",
            get(activity::evaluate_page).post(activity::evaluate_handler),
        )
        .route(
            "/registrations",
            get(registrations::my_registrations_handler),
        )
        .route(
            "/registrations/:registration_id/cancel",
            post(registrations::cancel_registration_handler),
        );

    Router::new()
        // Public routes
        .route("/", get(auth::root_handler))
        .route("/auth", get(|| async { Redirect::to(LOGIN_PATH) }))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/signup", get(auth::signup_page).post(auth::signup_handler))
        .route("/logout", post(auth::logout_handler))
        .route(
            "/functions/v1/evaluate-activity",
            post(functions::evaluate_activity_handler),
        )
        // Guarded routes
        .merge(guarded(any_user, RouteAccess::AUTHENTICATED))
        .merge(guarded(members, RouteAccess::MEMBERS))
        .merge(guarded(teachers, RouteAccess::TEACHERS))
        .merge(guarded(students, RouteAccess::STUDENTS))
        .layer(from_fn_with_state(state.clone(), resolve_session))
        // Static files
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
