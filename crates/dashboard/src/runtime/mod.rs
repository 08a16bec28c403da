mod reveal;
mod status;
mod worker;

pub(crate) use worker::spawn_session_worker;
