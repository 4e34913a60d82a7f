//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Public authentication routes
        .service(
            web::scope("/auth")
                .route("/sign-up", web::post().to(auth::sign_up))
                .route("/sign-in", web::post().to(auth::sign_in)),
        )
        // Everything below requires a Bearer token
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list))
                .route("", web::put().to(users::update_me))
                .route("/{id}", web::get().to(users::get_by_id))
                .route("/{id}", web::delete().to(users::delete)),
        )
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::list))
                .route("", web::post().to(posts::create))
                .route("/{id}", web::get().to(posts::get_by_id))
                .route("/{id}", web::put().to(posts::update))
                .route("/{id}", web::delete().to(posts::delete))
                .route("/{id}/reactions", web::post().to(posts::react))
                .route("/{id}/comments", web::post().to(posts::add_comment))
                .route(
                    "/{post_id}/comments/{comment_id}",
                    web::put().to(posts::update_comment),
                )
                .route(
                    "/{post_id}/comments/{comment_id}",
                    web::delete().to(posts::delete_comment),
                ),
        );
}
