//! Low-level helpers for reading and writing XLSX packages.
pub(crate) mod xml;
pub(crate) mod zip;
