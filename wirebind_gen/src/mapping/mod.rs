/* Native type classification and wire type mapping */

pub mod category;
pub mod wire;

pub use category::{AddressKind, TypeCategory, WrapperKind, lookup, plain_scalar_wire};
pub use wire::{Classification, classify, proto_import, to_wire_type, wire_token};
