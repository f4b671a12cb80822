//! Query-time retrieval and answer synthesis.

mod pipeline;
mod template;

pub use pipeline::{Answer, RetrievalPipeline};
pub use template::{answer_template, build_context, CONTEXT_SEPARATOR};
