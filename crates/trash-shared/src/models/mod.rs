mod page;
mod space;
mod trash;
mod user;

pub use page::*;
pub use space::*;
pub use trash::*;
pub use user::*;
