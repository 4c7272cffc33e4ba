pub(crate) mod dimensions;
