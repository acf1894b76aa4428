//! Binary object streams.
//!
//! A stream is a flat byte buffer of bincode encoded values. All integers are
//! fixed width little endian, so records written by one build can be read by
//! any other (save games, replays, network object sync).

pub mod obj_stream;
