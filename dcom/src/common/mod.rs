pub(crate) mod bits;
pub(crate) mod function;
pub(crate) mod header;
