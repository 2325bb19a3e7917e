//! Find and replace for quire.
//!
//! [`SearchCoordinator`] sits between the editor and a
//! [`TextSurface`](quire_surface::TextSurface): it turns find, replace and
//! replace-all requests into bounded searches, moves the selection and
//! remembers where the session left off.

mod coordinator;
mod incremental;
mod request;
mod state;

pub use coordinator::SearchCoordinator;
pub use request::SearchRequest;
pub use state::SearchState;
