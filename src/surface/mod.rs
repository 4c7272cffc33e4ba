pub(crate) mod allocator;
pub(crate) mod manager;
pub(crate) mod session;
