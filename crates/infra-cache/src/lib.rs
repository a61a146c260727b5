// Token Display Infrastructure - Cache Store Adapters
// Implements: DisplayCache (DashMap with TTL, no-op)

mod memory;
mod noop;
mod sweeper;

pub use memory::MemoryDisplayCache;
pub use noop::NoOpDisplayCache;
pub use sweeper::CacheSweeper;
