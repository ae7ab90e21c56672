//! Library surface behind the `scie` binary, split out so command handlers
//! can be exercised directly in tests (mirrors `knhk-cli`'s
//! lib-plus-thin-bin split).

pub mod commands;
pub mod context;
