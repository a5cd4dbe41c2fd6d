pub(crate) mod domain;
pub(crate) mod length;
pub(crate) mod region;
