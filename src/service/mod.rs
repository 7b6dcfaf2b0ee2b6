pub mod leave;

pub use leave::LeaveService;
