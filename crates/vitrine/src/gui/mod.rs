pub mod app;
pub mod dots;
pub mod gallery;
pub mod theme;
