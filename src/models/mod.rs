pub mod fields;
pub mod todo;

pub use fields::{Category, DueDate, Priority, Status};
pub use todo::{
    AgendaQueryParams, NewTodo, NewTodoRequest, QueryFields, Todo, TodoChanges, TodoFilter,
    TodoQueryParams, UpdateTodoRequest,
};
