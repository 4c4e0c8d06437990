mod batcher;
mod dataset;
mod ngram;
mod tokenizer;

pub use batcher::*;
pub use dataset::*;
pub use ngram::*;
pub use tokenizer::*;
