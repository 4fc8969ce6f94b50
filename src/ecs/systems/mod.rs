pub mod detection;
pub mod events;
pub mod goodwill;
pub mod leases;
pub mod sessions;

pub use detection::DetectionPlugin;
pub use events::EventsPlugin;
pub use goodwill::GoodwillPlugin;
pub use leases::LeasesPlugin;
pub use sessions::SessionsPlugin;
