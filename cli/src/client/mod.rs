//! HTTP clients for wikisync.
//!
//! - [`OpenAiCompatibleGenerator`] - Commit message generation
//! - [`HttpConnectivity`] - Reachability probe before the shutdown flush

pub mod connectivity;
pub mod llm;
pub mod middleware;

pub use connectivity::{Connectivity, HttpConnectivity};
pub use llm::{OpenAiCompatibleGenerator, TextGenerator};

#[cfg(test)]
pub use connectivity::MockConnectivity;
#[cfg(test)]
pub use llm::MockTextGenerator;
