pub mod annotation_tree;
mod common;
mod java;
mod kotlin;
mod scope;

pub use annotation_tree::{RawAnnotation, RawArgument, RawValue};
pub use common::{ParseResult, Parser};
pub use java::JavaParser;
pub use kotlin::KotlinParser;
pub use scope::ImportScope;
