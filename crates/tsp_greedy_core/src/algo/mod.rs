pub(crate) mod adjacency;
pub(crate) mod endpoints;
pub(crate) mod linearize;
pub(crate) mod matching;
pub(crate) mod permutation;
