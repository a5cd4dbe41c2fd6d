pub(crate) mod config;
pub(crate) mod input;
pub(crate) mod options;
pub(crate) mod output;
