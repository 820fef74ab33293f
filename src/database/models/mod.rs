pub mod category;
pub mod customization;
pub mod item;
