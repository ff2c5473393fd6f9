pub mod emitters;
pub mod generator;
pub mod literals;

pub use generator::GoGenerator;
