//! Document access
//!
//! Parsing, namespace-aware navigation and permit/return extraction for the
//! multi-return submission document.

pub mod extractor;
pub mod navigator;

pub use extractor::{distinct_licence_numbers, extract_returns, paths, ReturnEntry};
pub use navigator::{
    Element, Namespaces, Navigator, XmlDocument, MULTI_RETURN_NAMESPACE, MULTI_RETURN_PREFIX,
};
