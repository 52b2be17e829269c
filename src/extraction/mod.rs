pub mod discriminator;
pub mod number_parser;
pub mod text_filter;
pub mod types;
