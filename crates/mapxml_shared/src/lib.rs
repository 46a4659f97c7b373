//! Shared plumbing for the mapxml crates: the buffered character stream the
//! scanner reads from, and the line/column bookkeeping attached to every
//! token and error.

pub mod byte_stream;
