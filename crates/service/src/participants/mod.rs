pub mod ids;
pub mod service;
pub mod update;

pub use ids::next_id;
pub use service::ParticipantService;
pub use update::ParticipantUpdate;
