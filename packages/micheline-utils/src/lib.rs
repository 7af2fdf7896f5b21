pub mod error;
pub mod micheline;
pub mod michelson;

pub use error::MichelineError;
pub use micheline::Micheline;
pub use michelson::parse_michelson;
