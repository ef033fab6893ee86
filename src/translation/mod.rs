/*!
 * Translation orchestration: per-service profiles, chunk dispatch,
 * progress reporting, and the end-to-end pipeline.
 */

pub mod dispatcher;
pub mod pipeline;
pub mod profiles;
pub mod progress;

pub use dispatcher::{DispatchOptions, dispatch_chunks};
pub use pipeline::{PipelineState, TranslatedSelection, TranslationPipeline};
pub use profiles::ServiceProfile;
pub use progress::{ProgressEvent, ProgressPhase, ProgressSink};
