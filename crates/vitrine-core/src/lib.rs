//! Toolkit-agnostic navigation logic for vitrine: the centered-item carousel,
//! the rotating panel navigator and the control-socket command vocabulary.

#[macro_use]
mod macros;

pub mod carousel;
pub mod cube;
pub mod geometry;
pub mod indicator;
pub mod ipc;
pub mod pacing;

pub use carousel::{
    CarouselConfig, CarouselError, CenteredCarousel, ScrollAction, ScrollBehavior, ScrollHost,
    ScrollTarget, Step, WrapMode,
};
pub use cube::{CubeConfig, CubeError, CubeNavigator, Heading, Rotation};
pub use geometry::{Item, Viewport};
pub use indicator::{Indicator, IndicatorLabel};
