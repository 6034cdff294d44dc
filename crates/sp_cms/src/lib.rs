pub mod client;

pub use client::StrapiClient;
