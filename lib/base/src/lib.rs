pub mod duration_ext;
pub mod system;
