pub mod srinivas;
pub mod zdt1;

pub use srinivas::Srinivas;
pub use zdt1::Zdt1;
