//! kw-master: handbook Q&A, credit diagnosis and conflict-checked timetables,
//! laid out as a hexagon (domain, ports, adapters, use cases).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
