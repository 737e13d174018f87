// Core modules implementing tokenization, decoding, rendering, and error modeling.
pub mod decode;
pub mod error;
pub mod render;
pub mod table;
pub mod token;
