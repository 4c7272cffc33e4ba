pub(crate) mod host;
pub(crate) mod pipeline;
pub(crate) mod unit;
