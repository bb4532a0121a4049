pub mod query_mapper;

pub use query_mapper::QueryMapper;
