use axum::Router;

mod assignments;
mod auth;
mod designers;
mod files;
mod health;
mod projects;

pub fn configure_routes(router: Router) -> Router {
    router
        .merge(health::configure())
        .nest("/auth", auth::configure())
        .nest(
            "/projects",
            projects::configure()
                .merge(files::configure())
                .merge(assignments::project_routes()),
        )
        .merge(assignments::configure())
        .merge(designers::configure())
}
