pub mod error;
pub mod ids;
pub mod index;
pub mod metadata;
pub mod resolve;
pub mod search;
pub mod source;

pub use error::RegistryError;
pub use index::{Dataset, Index};
pub use metadata::{Column, DetailFacts, Metadata, Preview, Schema};
pub use resolve::{
    artifact_url, artifact_urls, candidates, resolve_index, ArtifactUrls, Candidate, CandidateFailure,
    CandidateOrigin, LoadedIndex,
};
pub use search::filter_datasets;
pub use source::Fetcher;
