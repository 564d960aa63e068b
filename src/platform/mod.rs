//! Platform detection and mount enumeration collaborators.

pub mod pal;
