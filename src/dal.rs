pub mod journeys;
pub mod routes;
pub mod stop_times;
pub mod stops;
pub mod users;

pub use journeys::*;
pub use routes::*;
pub use stop_times::*;
pub use stops::*;
pub use users::*;
