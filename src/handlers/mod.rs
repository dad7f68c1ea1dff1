pub mod health_handler;
pub mod session_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_live};
pub use session_handler::{
    complete_round, enter_round, get_audio, get_report, get_session, restart_session,
    start_session, submit_answer, submit_batch,
};

/// Registers every route. Shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(start_session)
        .service(get_session)
        .service(enter_round)
        .service(submit_answer)
        .service(submit_batch)
        .service(complete_round)
        .service(get_report)
        .service(restart_session)
        .service(get_audio);
}
