//! Message parsing: envelope headers, charset recovery, strict reading, and the MIME walk.

pub mod charset;
pub mod header;
pub mod mime;
pub mod reader;
