//! On-disk state for the carp certificate authority.
//!
//! A single data directory is the unit of CA state. This crate owns the
//! directory layout, the atomic single-file replace primitive, the
//! multi-file stage/commit helper, and the codecs for the hex counters,
//! the JSON certificate index, and the PEM artifacts. It knows nothing
//! about X.509 semantics; that lives in `carp-x509`.

mod atomic;
mod counter;
mod error;
mod index;
mod layout;
mod pemfile;

pub use atomic::{write_atomic, Stage, MODE_PUBLIC, MODE_SECRET};
pub use counter::{counter_bytes, format_serial, format_serial_bytes, read_counter, write_counter};
pub use error::StoreError;
pub use index::{encode_index, load_index, save_index, CertStatus, IndexEntry};
pub use layout::DataDir;
pub use pemfile::{load_pem, read_pem_block};
