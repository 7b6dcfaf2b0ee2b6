pub mod date;
pub mod db_utils;
pub mod email_cache;
pub mod email_filter;
pub mod employee_locks;
pub mod validation;
