pub mod detail;
pub mod feed;
pub mod record;
pub mod state;

pub use detail::{DetailState, DetailView};
pub use feed::{CategorizedFeed, FeedState};
pub use record::{DetailRecord, RecordBuilder, RenderRecord};
pub use state::{StatusTag, Ticket, ViewMachine, ViewState};
