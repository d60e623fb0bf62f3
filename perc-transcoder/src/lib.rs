//! # perc transcoder
//! The transcoder crate handles the actual encoding and decoding of
//! data at runtime. It implements the unaligned packed encoding rules
//! of ITU-T X.691: codecs are built from declarative schema nodes (or
//! assembled directly from constraints records) and then read from and
//! write to a bit-precise [`BitBuffer`].
//!
//! Codecs are immutable after construction and hold no hidden state;
//! every operation takes the buffer explicitly, completes
//! synchronously, and propagates a typed [`CodecError`] on failure.
//!
//! ## Usage
//! Let's consider the following ASN1 Sequence:
//! ```asn1
//! ExampleSequence ::= SEQUENCE {
//!   member-1 IA5String (SIZE (1..24)),
//!   member-2 INTEGER (0..15)
//! }
//! ```
//!
//! ```rust
//! use perc_transcoder::{build, registry_from_json, BitBuffer, Value};
//!
//! let registry = registry_from_json(r#"{
//!     "ExampleSequence": {
//!         "type": "SEQUENCE",
//!         "fields": [
//!             {"name": "member-1", "schema": {"type": "IA5String", "minSize": 1, "maxSize": 24}},
//!             {"name": "member-2", "schema": {"type": "INTEGER", "min": 0, "max": 15}}
//!         ]
//!     }
//! }"#).unwrap();
//! let codec = build(&registry["ExampleSequence"]).unwrap();
//!
//! let document = Value::record(&[
//!     ("member-1", Value::from("Hello, World!")),
//!     ("member-2", Value::Integer(8)),
//! ]);
//! let mut buf = BitBuffer::new();
//! codec.encode(&mut buf, &document).unwrap();
//!
//! let mut replay = BitBuffer::from_bytes(&buf.to_bytes());
//! assert_eq!(codec.decode(&mut replay).unwrap(), document);
//! ```
//!
//! For byte-exact extraction of substructures, use
//! [`Codec::decode_with_metadata`](uper::Codec::decode_with_metadata):
//! every decoded node carries its bit offset, bit length and a copy of
//! the source bytes covering it.

pub mod buffer;
pub mod builder;
pub mod error;
pub mod node;
pub mod schema;
pub mod uper;
pub mod value;

pub use buffer::BitBuffer;
pub use builder::{build, build_all, ReferenceCodec};
pub use error::{CodecError, CodecErrorType};
pub use node::{strip_metadata, CodecKind, DecodedField, DecodedNode, DecodedValue, Metadata};
pub use schema::{registry_from_json, registry_to_json, FieldSchema, SchemaNode, SchemaRegistry};
pub use uper::{Codec, IntegerConstraints, SizeConstraints, StringKind, UNKNOWN_ALTERNATIVE};
pub use value::{BitStringValue, Value};
