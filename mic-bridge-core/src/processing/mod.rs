pub mod converter;
pub mod ring_buffer;
pub mod shared_ring;
