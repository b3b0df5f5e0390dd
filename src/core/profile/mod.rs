pub mod model;
pub mod store;

pub use model::{LoaderType, Profile, ProfileDraft, SkinSelection};
pub use store::ProfileStore;
