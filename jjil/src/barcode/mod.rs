//! Barcode symbologies.

pub mod ean13;
