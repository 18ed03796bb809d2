mod map;
pub use map::*;
mod consteval;
pub use consteval::*;
mod primitive;
pub use primitive::*;
mod normalize;
mod layout;
mod function;
pub use function::*;
mod builder;
pub use builder::*;
mod dump;
pub use dump::*;
