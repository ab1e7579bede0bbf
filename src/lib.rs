//! Excel to PDF MCP Server Library
//!
//! This crate converts spreadsheets to PDF through LibreOffice and exposes
//! the conversion on two surfaces:
//! - MCP tools over stdio: `convert_excel_to_pdf`, `convert_numbers_to_pdf`
//! - HTTP: `POST /convert/excel-to-pdf`, `POST /convert/numbers-to-pdf`

pub mod config;
pub mod convert;
pub mod error;
pub mod http;
pub mod server;
pub mod source;

pub use config::{HttpConfig, ServerConfig};
pub use convert::{
    ConversionInvoker, ConversionOutcome, ConversionRequest, Converter, DocumentKind,
    LibreOfficeConverter, OutputFormat,
};
pub use error::{Error, Result};
pub use server::{
    run_server_with_config, serve_stdio, ConvertServer, ConvertToolParams, ConvertToolResult,
};
