/// An in-memory host with nested call and creation support
pub mod host;
