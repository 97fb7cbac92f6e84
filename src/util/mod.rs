pub mod request_scheduler;
