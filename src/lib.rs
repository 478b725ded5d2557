pub mod config;
pub mod encoding;
pub mod error_codes;
pub mod grouping;
pub mod inputs;
pub mod logging;
pub mod loudness;
pub mod markup;
pub mod model;
pub mod pipeline;
pub mod reveal;
pub mod style;
pub mod timeline;
pub mod wrap;
