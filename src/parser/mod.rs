/// Library-independent expression tree and call-chain helpers.
pub mod expr;
/// Entity and column naming helpers.
pub mod names;
/// tree-sitter based TypeScript parsing.
pub mod ts_parser;
