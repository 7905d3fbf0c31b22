pub mod image_io;
pub mod ser;
pub mod source;
pub mod table;
