//! Smartflow
//!
//! Layout and viewing engine of a mobile news reader: fits articles into line-aligned
//! columns, and shows paginated print issues with discrete zoom levels, a bounded window
//! of materialized pages and gesture-driven navigation.
//!
//! The core is single-threaded and UI-agnostic. Hosts feed it parsed JSON, measurements and
//! gesture events, and observe it through [`state::EventBus`].

pub mod config;
pub mod images;
pub mod layout;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view_state;
