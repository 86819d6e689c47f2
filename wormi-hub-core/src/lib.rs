//! Wormi Hub Core Library
//!
//! Calendar export for network events, plus the dataset model, filters and
//! signup forms of the Wormi Hub community composting site.

pub mod display;
pub mod error;
pub mod export;
pub mod filters;
pub mod forms;
pub mod ics;
pub mod preferences;
pub mod source;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        display::*, export::*, filters::*, forms::*, ics::*, preferences::*, source::*, types::*,
    };
}
