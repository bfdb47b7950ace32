pub mod map;
pub mod translate;
pub mod upstream;
