//! Terminal front end for the law office API: page models over the REST
//! routes, the client editor and text rendering.

pub mod api;
pub mod editor;
pub mod model;
pub mod page;
pub mod render;

pub use api::{ApiClient, ApiError};
pub use editor::{ClientEditor, EditorError, EditorMode};
pub use page::{DetailPage, ListPage, PageState};
