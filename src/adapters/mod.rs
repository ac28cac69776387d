//! Snapshot stores behind [`SnapshotRepository`](crate::ports::SnapshotRepository).
//!
//! `MsgPackRepository` writes agents to disk; `InMemoryRepository` keeps
//! encoded snapshots in a shared map for tests.

pub mod in_memory_repository;
pub mod msgpack_repository;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
