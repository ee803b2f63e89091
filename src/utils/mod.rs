pub mod address_codec;

pub use address_codec::{AddressCodec, AddressKind, SegwitAddress};
