pub mod envelope;
pub mod licences;

pub use envelope::SuccessResponse;
