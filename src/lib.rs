//! kgflow - run Graphiti workflow nodes from the command line

pub mod commands;
