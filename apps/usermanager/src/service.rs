//! Users gRPC service implementation
//!
//! Handlers convert the request, validate it, and hand it to the domain
//! service. Invalid requests never reach password hashing or the store.

use domain_users::{UserRepository, UserService};
use messaging::ChangeNotifier;
use rpc::users::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse,
    GetUserPageRequest, GetUserPageResponse, UpdateUserRequest, UpdateUserResponse,
    users_service_server::UsersService,
};
use tonic::{Request, Response, Status};
use tracing::info;
use validator::Validate;

use crate::conversions::{
    create_input, status_from_error, update_input, user_page, user_summary, validation_status,
};

pub struct UsersServiceImpl<R, N>
where
    R: UserRepository + 'static,
    N: ChangeNotifier + 'static,
{
    service: UserService<R, N>,
}

impl<R, N> UsersServiceImpl<R, N>
where
    R: UserRepository + 'static,
    N: ChangeNotifier + 'static,
{
    pub fn new(service: UserService<R, N>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<R, N> UsersService for UsersServiceImpl<R, N>
where
    R: UserRepository + 'static,
    N: ChangeNotifier + 'static,
{
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let input = create_input(request.into_inner());
        input.validate().map_err(validation_status)?;

        let id = self
            .service
            .create_user(input)
            .await
            .map_err(status_from_error)?;

        info!(user_id = %id, "Created user");
        Ok(Response::new(CreateUserResponse { id: id.to_string() }))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        let input = update_input(request.into_inner());
        input.validate().map_err(validation_status)?;

        let id = self
            .service
            .update_user(input)
            .await
            .map_err(status_from_error)?;

        info!(user_id = %id, "Updated user");
        Ok(Response::new(UpdateUserResponse { id: id.to_string() }))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        let req = request.into_inner();
        let id = self
            .service
            .delete_user(&req.id)
            .await
            .map_err(status_from_error)?;

        info!(user_id = %id, "Deleted user");
        Ok(Response::new(DeleteUserResponse { id: id.to_string() }))
    }

    async fn get_user_page(
        &self,
        request: Request<GetUserPageRequest>,
    ) -> Result<Response<GetUserPageResponse>, Status> {
        let page = user_page(request.into_inner())?;
        page.validate().map_err(validation_status)?;

        let users = self
            .service
            .list_users(page)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(GetUserPageResponse {
            users: users.into_iter().map(user_summary).collect(),
        }))
    }
}
