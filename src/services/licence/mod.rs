pub mod model;
pub mod source;
pub mod verifier;
pub mod view;

pub use model::{ContextLicences, LicenceRecord, License};
pub use source::{LicenceSource, PgLicenceSource};
pub use verifier::{LicenceError, LicenceVerifier, filter_licences, is_licence_found};
pub use view::LicenceView;
