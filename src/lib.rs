//! `mail2chat` — reduce raw e-mail to the latest reply, ready for a chat channel.
//!
//! The core decides whether a message matches a profile's filter, recovers a
//! correctly decoded body from arbitrarily nested MIME, strips quoted reply
//! history and mail-client markup, and extracts attachments not already seen
//! during this run. [`pipeline::process_message`] ties the steps together.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod strip;
