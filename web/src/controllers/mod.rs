use actix_web::{web, HttpResponse};

use db::SwordDrillable;

/// Registers the API routes for a store type.
///
/// The passage route catches every single segment path, so it has to be
/// registered after the `/api` resources.
pub fn configure<S>(cfg: &mut web::ServiceConfig)
where
    S: SwordDrillable + 'static,
{
    cfg.service(web::resource("/api/translations").route(web::get().to(api::translations::<S>)))
        .service(web::resource("/api/books").route(web::get().to(api::books::<S>)))
        .service(web::resource("/api/search").route(web::get().to(api::search::<S>)))
        .service(web::resource("/api/verses").route(web::post().to(api::add_verse::<S>)))
        .service(
            web::resource("/{reference}")
                .name("reference")
                .route(web::get().to(api::passage::<S>)),
        )
        .default_service(web::route().to(HttpResponse::NotFound));
}

pub mod api;
