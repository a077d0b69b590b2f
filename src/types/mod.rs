pub mod date;
pub mod olid;

pub mod author;
pub mod book;
pub mod publisher;
pub mod source_record;
pub mod work;
