mod pages;
mod pagination;
mod trash;

pub use pages::*;
pub use pagination::*;
pub use trash::*;
