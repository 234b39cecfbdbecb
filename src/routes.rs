use crate::{
    api::{attendance, dashboard, employee, holiday, leave_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter shared by every worker.
pub fn build_limiter(requests_per_min: u32) -> Result<Arc<Limiter>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min} requests per minute"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Arc<Limiter>) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiter) // rate limiting
            .service(
                web::scope("/user")
                    .service(
                        web::resource("/leave-form")
                            .route(web::post().to(leave_request::submit_leave)),
                    )
                    .service(
                        web::resource("/leave-forms").route(web::get().to(leave_request::my_leaves)),
                    )
                    .service(
                        web::resource("/all-leave-forms")
                            .route(web::get().to(leave_request::all_leaves)),
                    )
                    // /user/leave-form/{id}
                    .service(
                        web::resource("/leave-form/{id}")
                            .route(web::get().to(leave_request::get_leave)),
                    )
                    // /user/leave-form/{id}/status
                    .service(
                        web::resource("/leave-form/{id}/status")
                            .route(web::put().to(leave_request::decide_leave)),
                    )
                    .service(web::resource("/holidays").route(web::get().to(holiday::user_holidays)))
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(attendance::mark_own))
                            .route(web::get().to(attendance::my_attendance)),
                    )
                    .service(
                        web::resource("/attendance/summary")
                            .route(web::get().to(attendance::my_summary)),
                    )
                    .service(
                        web::resource("/get-users").route(web::get().to(employee::list_employees)),
                    )
                    .service(web::resource("/get-user").route(web::get().to(employee::my_profile))),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/leave-summary")
                            .route(web::get().to(leave_request::leave_summary)),
                    )
                    .service(web::resource("/holidays").route(web::get().to(holiday::list_holidays)))
                    .service(
                        web::resource("/holidays/active")
                            .route(web::get().to(holiday::active_holidays)),
                    )
                    .service(web::resource("/holiday").route(web::post().to(holiday::add_holiday)))
                    // /admin/holiday/{id}
                    .service(
                        web::resource("/holiday/{id}")
                            .route(web::put().to(holiday::update_holiday))
                            .route(web::delete().to(holiday::delete_holiday)),
                    )
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(attendance::mark_bulk))
                            .route(web::get().to(attendance::attendance_on)),
                    )
                    .service(
                        web::resource("/employee").route(web::post().to(employee::create_employee)),
                    )
                    // /admin/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard))),
            ),
    );
}
