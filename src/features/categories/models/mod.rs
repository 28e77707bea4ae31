mod category;
mod drag;

pub use category::{position_of_category, Category, Subcategory, TreeSnapshot, TreeVersion};
pub use drag::{DragItem, DragMove};
