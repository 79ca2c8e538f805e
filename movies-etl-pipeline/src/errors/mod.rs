mod extractor;
mod loader;
mod orchestrator;
mod transformer;
mod verifier;

pub use extractor::ExtractError;
pub use loader::LoadError;
pub use orchestrator::PipelineError;
pub use transformer::TransformError;
pub use verifier::VerifyError;
