pub mod db;
pub mod error;
pub mod model;
pub mod seed;
pub mod store;

pub use db::DynamoStore;
pub use error::CoreError;
pub use model::{
    AlignmentAxis, AlignmentFilter, ClickEvent, EnrichedClick, Mysfit, MysfitId, MysfitIdError,
    MysfitProfile, Question, UnknownAxis,
};
pub use store::{MemoryStore, MysfitStore, QuestionStore};
