use crate::{api::students, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let create_limiter = Arc::new(build_limiter(config.rate_create_per_min));
    let attendance_limiter = Arc::new(build_limiter(config.rate_attendance_per_min));
    let list_limiter = Arc::new(build_limiter(config.rate_list_per_min));

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/students")
                // /students
                .service(
                    web::resource("")
                        .wrap(create_limiter.clone())
                        .route(web::post().to(students::create_student))
                        .route(web::get().to(students::list_students)),
                )
                // /students/present
                .service(
                    web::resource("/present")
                        .wrap(list_limiter.clone())
                        .route(web::get().to(students::list_present)),
                )
                // /students/rolls/{roll}/available
                .service(
                    web::resource("/rolls/{roll}/available")
                        .wrap(list_limiter)
                        .route(web::get().to(students::roll_available)),
                )
                // /students/{id}/check-in
                .service(
                    web::resource("/{id}/check-in")
                        .wrap(attendance_limiter.clone())
                        .route(web::put().to(students::check_in)),
                )
                // /students/{id}/check-out
                .service(
                    web::resource("/{id}/check-out")
                        .wrap(attendance_limiter)
                        .route(web::put().to(students::check_out)),
                ),
        ),
    );
}
