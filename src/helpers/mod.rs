//! Low-level decoding helpers shared by the transcript readers.

pub(crate) mod text;
pub(crate) mod xml;
pub(crate) mod zip;
