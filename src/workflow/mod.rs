pub mod extract_flow;
pub mod paper_ctx;

pub use extract_flow::{ExtractFlow, ExtractOutcome};
pub use paper_ctx::PaperCtx;
