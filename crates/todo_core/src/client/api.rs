//! Client-facing handler contract.

use crate::model::todo::Todo;
use crate::repo::todo_repo::TodoRepository;
use crate::service::todo_service::{
    CreateTodoInput, DeleteTodoInput, DeleteTodoResult, GetTodosInput, ServiceResult, TodoService,
    UpdateTodoInput,
};

/// The four handlers a client may call.
pub trait TodoApi {
    fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo>;
    fn get_todos(&self, input: &GetTodosInput) -> ServiceResult<Vec<Todo>>;
    fn update_todo(&self, input: &UpdateTodoInput) -> ServiceResult<Todo>;
    fn delete_todo(&self, input: &DeleteTodoInput) -> ServiceResult<DeleteTodoResult>;
}

impl<R: TodoRepository> TodoApi for TodoService<R> {
    fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo> {
        TodoService::create_todo(self, input)
    }

    fn get_todos(&self, input: &GetTodosInput) -> ServiceResult<Vec<Todo>> {
        TodoService::get_todos(self, input)
    }

    fn update_todo(&self, input: &UpdateTodoInput) -> ServiceResult<Todo> {
        TodoService::update_todo(self, input)
    }

    fn delete_todo(&self, input: &DeleteTodoInput) -> ServiceResult<DeleteTodoResult> {
        TodoService::delete_todo(self, input)
    }
}

impl<A: TodoApi + ?Sized> TodoApi for &A {
    fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo> {
        (**self).create_todo(input)
    }

    fn get_todos(&self, input: &GetTodosInput) -> ServiceResult<Vec<Todo>> {
        (**self).get_todos(input)
    }

    fn update_todo(&self, input: &UpdateTodoInput) -> ServiceResult<Todo> {
        (**self).update_todo(input)
    }

    fn delete_todo(&self, input: &DeleteTodoInput) -> ServiceResult<DeleteTodoResult> {
        (**self).delete_todo(input)
    }
}
