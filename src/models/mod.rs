pub mod task;

pub use task::{
    CreateTaskRequest, NewTask, Task, TaskChanges, UpdateTaskRequest, DEFAULT_PRIORITY,
    STATUS_PENDING,
};
