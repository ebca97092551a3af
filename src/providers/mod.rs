//! Content providers
//!
//! A provider turns a remote source into [`MediaRecord`]s. Two shapes exist:
//! [`Thingiverse`] walks a paginated JSON API inside a date window, and
//! [`McCordMuseum`] extracts one record from each collection page it is given.
//! Both share the injected [`Requester`](crate::fetch::Requester) and are looked
//! up by name through the [`ProviderRegistry`].

pub mod mccord;
pub mod registry;
pub mod thingiverse;
pub mod traits;
pub mod types;

pub use mccord::McCordMuseum;
pub use registry::{ProviderRegistry, RegistryError};
pub use thingiverse::Thingiverse;
pub use traits::{Provider, ProviderError};
pub use types::{
    Creator, IngestContext, IngestTarget, MediaRecord, MetaData, Tag, normalize_tags,
    render_template,
};
