//! # Schema Module
//!
//! The schema module holds the input side of the generator: the JSON
//! Hyper-Schema document model, loading from disk, and `$ref` resolution.
//!
//! ## Document Shape
//!
//! ```json
//! {
//!   "title": "Item Service",
//!   "definitions": { "item": { "type": "object" } },
//!   "links": [
//!     {
//!       "title": "get item",
//!       "method": "GET",
//!       "href": "/item",
//!       "schema": { "type": "object", "properties": { "id": { "type": "integer" } } },
//!       "targetSchema": { "$ref": "#/definitions/item" },
//!       "wrapper": ["auth", "log"]
//!     }
//!   ]
//! }
//! ```
//!
//! Links are collected from the root `links` array first, then from the
//! `links` array of every entry under `definitions` (key order). Keys the
//! model does not name are kept verbatim in [`Link::extras`] and decoded by
//! the parser.

mod load;
mod resolve;
mod types;

pub use load::*;
pub use resolve::*;
pub use types::*;
