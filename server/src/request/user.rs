use crate::controller::Intake;
use application::transfer::{AddLibrarianDto, GetAllUserDto, LoginDto, LogoutDto, RegisterDto};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    stream: Option<String>,
    year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddLibrarianRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug)]
pub struct LogoutRequest {
    access_token: String,
}

impl LogoutRequest {
    pub fn new(access_token: String) -> Self {
        Self { access_token }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetAllUserRequest {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub struct UserTransformer;

impl Intake<RegisterRequest> for UserTransformer {
    type To = RegisterDto;
    fn emit(&self, input: RegisterRequest) -> Self::To {
        RegisterDto {
            name: input.name,
            email: input.email,
            password: input.password,
            stream: input.stream,
            year: input.year,
        }
    }
}

impl Intake<AddLibrarianRequest> for UserTransformer {
    type To = AddLibrarianDto;
    fn emit(&self, input: AddLibrarianRequest) -> Self::To {
        AddLibrarianDto {
            name: input.name,
            email: input.email,
            password: input.password,
        }
    }
}

impl Intake<LoginRequest> for UserTransformer {
    type To = LoginDto;
    fn emit(&self, input: LoginRequest) -> Self::To {
        LoginDto {
            email: input.email,
            password: input.password,
        }
    }
}

impl Intake<LogoutRequest> for UserTransformer {
    type To = LogoutDto;
    fn emit(&self, input: LogoutRequest) -> Self::To {
        LogoutDto {
            access_token: input.access_token,
        }
    }
}

impl Intake<GetAllUserRequest> for UserTransformer {
    type To = GetAllUserDto;
    fn emit(&self, input: GetAllUserRequest) -> Self::To {
        GetAllUserDto {
            limit: input.limit,
            offset: input.offset,
        }
    }
}
