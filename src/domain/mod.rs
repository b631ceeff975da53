//! 领域协作方：任务 / 习惯 / 习惯进度的模型与存储接口

pub mod memory;
pub mod models;
pub mod store;

pub use memory::MemoryStore;
pub use models::{Cadence, Habit, HabitProgress, Priority, Task, TaskStatus};
pub use store::{DomainStores, HabitProgressStore, HabitStore, StoreError, TaskStore};
