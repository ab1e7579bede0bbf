//! Conversion layer
//!
//! Document kinds, the external converter seam, and the per-request
//! lifecycle both front ends run.

mod invoker;
mod kind;
mod libreoffice;
pub mod preflight;
mod request;

pub use invoker::{ConversionInvoker, Converter};
pub use kind::{source_extension, DocumentKind, OutputFormat};
pub use libreoffice::LibreOfficeConverter;
pub use request::{ConversionOutcome, ConversionRequest, RequestInput};
